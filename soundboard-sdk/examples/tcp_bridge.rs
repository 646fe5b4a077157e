//! Drive a sound board through a TCP-to-serial bridge
//!
//! Many serial servers (ser2net, ESP-Link, a Raspberry Pi running socat)
//! expose a UART as a raw TCP socket. This example lists the board's tracks
//! and plays the first one at half volume.
//!
//! Run with: cargo run -p soundboard-sdk --example tcp_bridge -- 192.168.1.40:4000

use std::net::TcpStream;
use std::time::Duration;

use soundboard_sdk::{init_logging, IoTransport, LoggingMode, Soundboard, SoundboardConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingMode::Development)?;

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:4000".to_string());
    println!("Connecting to {address}...");

    let stream = TcpStream::connect(&address)?;
    stream.set_read_timeout(Some(Duration::from_millis(5)))?;

    let config = SoundboardConfig::builder()
        .read_timeout(Duration::from_millis(200))
        .probe_limit(64)
        .build();
    let mut board = Soundboard::without_reset(IoTransport::new(stream), config);

    let tracks = board.tracks().to_vec();
    if tracks.is_empty() {
        println!("No tracks found; is the board in UART mode?");
        return Ok(());
    }

    println!("Found {} tracks:", tracks.len());
    for track in &tracks {
        println!(
            "   {:>3}  {}  {} bytes  {}s",
            track.index,
            track.name_lossy(),
            track.size_bytes,
            track.length_seconds
        );
    }

    match board.set_volume(0.5) {
        Some(level) => println!("\nVolume set to {level}"),
        None => println!("\nBoard did not report a volume"),
    }

    if board.play_now(tracks[0].index) {
        std::thread::sleep(Duration::from_millis(500));
        match board.track_time() {
            Ok(position) => println!("Playing: {}s of {}s", position.current, position.total),
            Err(e) => println!("Unreadable position: {e}"),
        }
        board.stop();
    } else {
        println!("Board refused to play track {}", tracks[0].index);
    }

    Ok(())
}
