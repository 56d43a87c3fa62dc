//! Print the bundled world map with the default hosts marked.
//!
//! Run with: cargo run -p laglens-core --example print_map -- 120 36

use laglens_core::{default_hosts, LatencyStatus, MapRasterizer, Marker};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let columns: u16 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(100);
    let rows: u16 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(30);

    let map = MapRasterizer::bundled()?;
    let hosts = default_hosts();
    let markers: Vec<Marker> = hosts
        .iter()
        .map(|h| Marker::new(h.latitude, h.longitude, LatencyStatus::Good))
        .collect();

    let grid = map.render(columns, rows, &markers)?;
    println!("{}", grid.to_plain_string());

    for host in &hosts {
        match map.cell_for(host.latitude, host.longitude, columns, rows) {
            Some((row, col)) => println!("{:<16} {:<28} row {row:>3} col {col:>3}", host.name, host.city),
            None => println!("{:<16} {:<28} off map", host.name, host.city),
        }
    }
    Ok(())
}
