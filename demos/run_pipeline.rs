use std::env;
use std::path::PathBuf;
use thermogrid::{Thermogrid, ThermogridError};

fn main() -> Result<(), ThermogridError> {
    let mut args = env::args().skip(1);
    let grid_path = PathBuf::from(args.next().unwrap_or_else(|| "data/temperature_grid.csv".into()));
    let coordinate_path = PathBuf::from(args.next().unwrap_or_else(|| "data/grid_coords.dat".into()));
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "out".into()));

    let client = Thermogrid::builder()
        .grid_path(grid_path)
        .coordinate_path(coordinate_path)
        .output_dir(output_dir)
        .build()?;

    let analysis = client.analyze()?;
    println!(
        "Wrote {} enriched records, {} window summaries, {} anomalies",
        analysis.enriched.len(),
        analysis.summaries.len(),
        analysis.anomalies.len()
    );

    Ok(())
}
