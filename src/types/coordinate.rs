/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are in decimal degrees.
///
/// # Examples
///
/// ```
/// use thermogrid::LatLon;
///
/// let utrecht = LatLon(52.0907, 5.1214);
/// assert_eq!(utrecht.0, 52.0907); // Latitude
/// assert_eq!(utrecht.1, 5.1214); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);
