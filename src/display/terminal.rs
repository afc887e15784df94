// src/display/terminal.rs
//! Terminal rendering of the map state and address label

use crate::{
    error::Result,
    gps::data::PositionFix,
    map::{tile_url, MapState},
    monitor::CycleOutcome,
};
use chrono::{DateTime, Utc};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType, DisableLineWrap, EnableLineWrap},
};
use std::io::{self, Write};

/// Markers listed under the map section, newest first.
const RECENT_MARKERS: usize = 5;

/// One screen worth of tracker state.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub device: Option<&'a str>,
    pub map: &'a MapState,
    pub label: &'a str,
    pub last_sentence: Option<&'a str>,
    pub last_update: Option<DateTime<Utc>>,
    pub outcome: Option<&'a CycleOutcome>,
}

pub struct TerminalDisplay;

impl TerminalDisplay {
    pub fn new() -> Self {
        Self
    }

    /// Hide the cursor and stop wrapping before the first frame.
    pub fn enter(&self) -> Result<()> {
        execute!(io::stdout(), Hide, DisableLineWrap)?;
        Ok(())
    }

    /// Restore the terminal.
    pub fn leave(&self) -> Result<()> {
        execute!(io::stdout(), Show, EnableLineWrap)?;
        println!("\nShutting down...");
        Ok(())
    }

    /// Redraw the whole screen.
    pub fn draw(&self, frame: &Frame<'_>) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        self.render(&mut stdout, frame)?;
        stdout.flush()?;
        Ok(())
    }

    /// Render the tracker state to any writer
    pub fn render(&self, out: &mut impl Write, frame: &Frame<'_>) -> Result<()> {
        execute!(
            out,
            SetForegroundColor(Color::Green),
            Print("=".repeat(60)),
            Print("\n"),
            Print("GPS Tracker"),
            Print("\n"),
            Print("=".repeat(60)),
            Print("\n"),
            ResetColor
        )?;

        let timestamp_str = match frame.last_update {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => "No fix yet".to_string(),
        };
        let device_str = frame.device.unwrap_or("not connected");
        execute!(
            out,
            Print(format!("Device:      {}\n", device_str)),
            Print(format!("Last Fix:    {}\n", timestamp_str))
        )?;
        if let Some(outcome) = frame.outcome {
            execute!(out, Print(format!("Status:      {}\n", outcome.describe())))?;
        }
        execute!(out, Print("\n"))?;

        self.render_map_section(out, frame.map)?;
        self.render_address_section(out, frame.label)?;
        self.render_raw_data_section(out, frame.last_sentence)?;

        execute!(
            out,
            SetForegroundColor(Color::Green),
            Print("=".repeat(60)),
            Print("\n"),
            Print("Press Ctrl+C to exit"),
            Print("\n"),
            ResetColor
        )?;

        Ok(())
    }

    fn render_map_section(&self, out: &mut impl Write, map: &MapState) -> Result<()> {
        let (lat, lon) = map.center();
        let (x, y) = map.center_tile();

        execute!(
            out,
            SetForegroundColor(Color::Yellow),
            Print("MAP:\n"),
            ResetColor,
            Print(format!("  Latitude:  {}\n", PositionFix::format_coordinate(lat))),
            Print(format!("  Longitude: {}\n", PositionFix::format_coordinate(lon))),
            Print(format!("  Zoom:      {:>12}\n", map.zoom())),
            Print(format!("  Tile:      {}\n", tile_url(map.zoom(), x, y))),
            Print(format!("  Markers:   {:>12}\n", map.markers().len()))
        )?;

        for marker in map.markers().iter().rev().take(RECENT_MARKERS) {
            execute!(
                out,
                Print(format!("    {:>11.6}, {:>11.6}\n", marker.lat, marker.lon))
            )?;
        }

        execute!(out, Print("\n"))?;
        Ok(())
    }

    fn render_address_section(&self, out: &mut impl Write, label: &str) -> Result<()> {
        execute!(
            out,
            SetForegroundColor(Color::Cyan),
            Print("ADDRESS:\n"),
            ResetColor,
            Print(format!("  {}\n\n", label))
        )?;
        Ok(())
    }

    fn render_raw_data_section(&self, out: &mut impl Write, last_sentence: Option<&str>) -> Result<()> {
        execute!(
            out,
            SetForegroundColor(Color::Blue),
            Print("RAW DATA:\n"),
            ResetColor,
            Print(format!("  {}\n\n", last_sentence.unwrap_or("No data")))
        )?;
        Ok(())
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}
