use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use qrcode::{Color, EcLevel, QrCode};

const GAME_TITLE: &str = "Landmark Rescue";
const MODULE_SIZE: i32 = 10;
const QUIET_ZONE: i32 = 4;

/// Generates a printable QR code poster linking to the game, plus a plain-text
/// hosting guide. One-shot; never talks to the running server.
#[derive(Parser, Debug)]
#[command(name = "qr_generator")]
struct Args {
    /// URL the QR code should open
    #[arg(default_value = "http://localhost:8002")]
    url: String,

    /// Output image path
    #[arg(short, long, default_value = "game_qr_code.svg")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let code = QrCode::with_error_correction_level(args.url.as_bytes(), EcLevel::L)
        .context("failed to encode the URL as a QR code")?;
    let svg = render_poster(&code, &args.url);
    std::fs::write(&args.output, svg)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("QR code saved as {}", args.output.display());

    std::fs::write("hosting_instructions.txt", HOSTING_INSTRUCTIONS)
        .context("failed to write hosting_instructions.txt")?;
    println!("Hosting instructions saved as hosting_instructions.txt");

    println!();
    println!("Game URL: {}", args.url);
    println!("Share the QR code for easy mobile access.");

    Ok(())
}

/// Lays out a white poster: title and subtitle up top, the QR code centered
/// with its quiet zone, usage hint and the encoded URL at the bottom.
fn render_poster(code: &QrCode, url: &str) -> String {
    let modules = code.to_colors();
    let width = code.width() as i32;

    let qr_size = (width + 2 * QUIET_ZONE) * MODULE_SIZE;
    let img_width = qr_size.max(400);
    let img_height = qr_size + 180;
    let origin_x = (img_width - width * MODULE_SIZE) / 2;
    let origin_y = 100;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = img_width,
        h = img_height,
    );
    let _ = write!(
        svg,
        r#"<rect width="{w}" height="{h}" fill="white"/>"#,
        w = img_width,
        h = img_height,
    );

    let center = img_width / 2;
    let _ = write!(
        svg,
        r#"<text x="{center}" y="36" text-anchor="middle" font-family="sans-serif" font-size="20" fill="black">{title}</text>"#,
        center = center,
        title = xml_escape(GAME_TITLE),
    );
    let _ = write!(
        svg,
        r#"<text x="{center}" y="68" text-anchor="middle" font-family="sans-serif" font-size="26" font-weight="bold" fill="black">Scan to Play!</text>"#,
        center = center,
    );

    for (index, color) in modules.iter().enumerate() {
        if *color == Color::Dark {
            let x = origin_x + (index as i32 % width) * MODULE_SIZE;
            let y = origin_y + (index as i32 / width) * MODULE_SIZE;
            let _ = write!(
                svg,
                r#"<rect x="{x}" y="{y}" width="{size}" height="{size}" fill="black"/>"#,
                x = x,
                y = y,
                size = MODULE_SIZE,
            );
        }
    }

    let _ = write!(
        svg,
        r#"<text x="{center}" y="{y}" text-anchor="middle" font-family="sans-serif" font-size="20" fill="black">Play on your mobile device!</text>"#,
        center = center,
        y = img_height - 48,
    );
    let _ = write!(
        svg,
        r#"<text x="{center}" y="{y}" text-anchor="middle" font-family="sans-serif" font-size="14" fill="gray">{url}</text>"#,
        center = center,
        y = img_height - 20,
        url = xml_escape(url),
    );

    svg.push_str("</svg>");
    svg
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const HOSTING_INSTRUCTIONS: &str = "\
# Landmark Rescue - Hosting & QR Code Setup Guide

## Quick Setup Options

### 1. Local Network Access (Immediate)
The game serves at http://localhost:8002 by default. For mobile devices on
the same WiFi, share your machine's network IP instead, e.g.
http://192.168.1.71:8002.

### 2. Cloud Hosting (Recommended for Public Access)
Any host that runs a Rust binary works. The usual suspects:

- Railway: connect the repository, deploy, get a public URL.
- Render: create a Web Service, build with `cargo build --release`, start
  with `./target/release/score_server`.
- Fly.io: `fly launch` from the repository root.

Set the PORT environment variable if your host assigns one, and DATABASE_URL
if the SQLite file should live somewhere specific.

### 3. Updating the QR Code
After deploying, regenerate the poster against the public URL:

    cargo run --bin qr_generator 'https://your-actual-url.example'

## Mobile Access Tips
- Verify the URL is reachable from the device before printing posters.
- For local network play, all devices must share the WiFi network.

## Notes
- The bundled SQLite database is fine for events and development. For a
  long-lived public deployment, put the database file on persistent storage.
- Enable HTTPS at the hosting layer for production.
";
