use std::env;
use std::path::PathBuf;
use thermogrid::{Thermogrid, ThermogridError};

fn main() -> Result<(), ThermogridError> {
    let mut args = env::args().skip(1);
    let grid_path = PathBuf::from(args.next().expect("usage: neighbor_query GRID COORDS OUT DAY AREA"));
    let coordinate_path = PathBuf::from(args.next().expect("missing coordinate path"));
    let output_dir = PathBuf::from(args.next().expect("missing output dir"));
    let reference_day: u32 = args
        .next()
        .expect("missing reference day")
        .parse()
        .expect("reference day must be a non-negative integer");
    let reference_area = args.next().expect("missing reference area");

    let client = Thermogrid::builder()
        .grid_path(grid_path)
        .coordinate_path(coordinate_path)
        .output_dir(output_dir)
        .build()?;

    let analysis = client.analyze()?;
    let filter = analysis.neighbor_filter();
    let results = client.neighbors(&filter, reference_day, &reference_area)?;

    println!(
        "{} rows within 500 km and 14 days of day {}, area {}",
        results.len(),
        reference_day,
        reference_area
    );
    for result in results.iter().take(10) {
        println!(
            "  day {} area {} temp {:.2} ratio {:.3} at {:.1} km",
            result.record.record.day,
            result.record.record.area,
            result.record.record.temperature,
            result.record.record.ratio,
            result.distance_km
        );
    }

    Ok(())
}
