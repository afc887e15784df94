// src/monitor.rs
//! Tracking session: owns the device and runs one read/decode/present cycle

use crate::{
    display::{terminal::Frame, AddressLabel, LabelState, MapView, ERROR_LABEL},
    geocode::ReverseGeocoder,
    gps::{
        data::{PositionFix, RawSentence},
        device::{self, DeviceHandle, LinkSettings, PortProvider},
        nmea::{self, DecodeError, DecodeOutcome},
    },
    map::MapState,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// What happened during one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Discovery found nothing; the read step was skipped.
    NoDevice,
    /// No complete line arrived (timeout, cut-off line) or the line was blank.
    NoSentence,
    /// A sentence that does not carry a decodable fix.
    Ignored,
    /// An RMC sentence flagged as not valid.
    InvalidFix,
    Malformed(DecodeError),
    ReadFailed(String),
    /// The map was updated; `address` is the label text or the geocoding error.
    Updated {
        fix: PositionFix,
        address: Result<String, String>,
    },
}

impl CycleOutcome {
    pub fn describe(&self) -> String {
        match self {
            CycleOutcome::NoDevice => "No GPS device connected".to_string(),
            CycleOutcome::NoSentence => "Waiting for data".to_string(),
            CycleOutcome::Ignored => "No position in last sentence".to_string(),
            CycleOutcome::InvalidFix => "Data is not valid".to_string(),
            CycleOutcome::Malformed(e) => format!("Malformed sentence: {}", e),
            CycleOutcome::ReadFailed(e) => format!("Read error: {}", e),
            CycleOutcome::Updated { fix, .. } => format!("Fix at {}", fix),
        }
    }
}

/// The running tracker: device handle plus its presentation collaborators.
///
/// `run_cycle` takes `&mut self`, so cycles can never overlap.
pub struct TrackerSession<M, L> {
    device: Option<DeviceHandle>,
    map: M,
    label: L,
    geocoder: Box<dyn ReverseGeocoder + Send>,
    last_sentence: Option<RawSentence>,
    last_update: Option<DateTime<Utc>>,
    absence_reported: bool,
}

impl<M: MapView, L: AddressLabel> TrackerSession<M, L> {
    pub fn new(
        device: Option<DeviceHandle>,
        map: M,
        label: L,
        geocoder: Box<dyn ReverseGeocoder + Send>,
    ) -> Self {
        Self {
            device,
            map,
            label,
            geocoder,
            last_sentence: None,
            last_update: None,
            absence_reported: false,
        }
    }

    /// Discover the device once, then build the session around it.
    pub fn start<P: PortProvider + ?Sized>(
        provider: &P,
        settings: &LinkSettings,
        map: M,
        label: L,
        geocoder: Box<dyn ReverseGeocoder + Send>,
    ) -> Self {
        let device = device::find_device(provider, settings);
        Self::new(device, map, label, geocoder)
    }

    /// Read one line, decode it and update the collaborators.
    ///
    /// Every failure stays inside the cycle and is reported through the
    /// returned outcome.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let Some(device) = self.device.as_mut() else {
            if self.absence_reported {
                debug!("No GPS device connected");
            } else {
                info!("No GPS device connected");
                self.absence_reported = true;
            }
            return CycleOutcome::NoDevice;
        };

        let sentence = match device.read_sentence() {
            Ok(Some(sentence)) if !sentence.is_empty() => sentence,
            Ok(_) => {
                debug!("No sentence this cycle");
                return CycleOutcome::NoSentence;
            }
            Err(e) => {
                warn!(port = device.port_name(), "Error reading from serial port: {}", e);
                return CycleOutcome::ReadFailed(e.to_string());
            }
        };
        debug!(line = %sentence, "Received line");

        let outcome = match nmea::decode(&sentence) {
            Ok(DecodeOutcome::Fix(fix)) => self.apply_fix(fix),
            Ok(DecodeOutcome::InvalidFix) => {
                debug!("Data is not valid");
                CycleOutcome::InvalidFix
            }
            Ok(DecodeOutcome::Ignored) => CycleOutcome::Ignored,
            Err(e) => {
                warn!(line = %sentence, "Malformed sentence: {}", e);
                CycleOutcome::Malformed(e)
            }
        };

        self.last_sentence = Some(sentence);
        outcome
    }

    fn apply_fix(&mut self, fix: PositionFix) -> CycleOutcome {
        let (lat, lon) = (fix.latitude(), fix.longitude());
        info!(lat, lon, "Position fix");

        self.map.set_center(lat, lon);
        self.map.add_marker(lat, lon);
        self.last_update = Some(Utc::now());

        let address = match self.geocoder.reverse(&fix) {
            Ok(text) => {
                self.label.set_text(&text);
                Ok(text)
            }
            Err(e) => {
                warn!("Reverse geocoding failed: {}", e);
                self.label.set_text(ERROR_LABEL);
                Err(e.to_string())
            }
        };

        CycleOutcome::Updated { fix, address }
    }

    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    pub fn device_port(&self) -> Option<&str> {
        self.device.as_ref().map(DeviceHandle::port_name)
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn label(&self) -> &L {
        &self.label
    }

    pub fn last_sentence(&self) -> Option<&RawSentence> {
        self.last_sentence.as_ref()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }
}

impl TrackerSession<MapState, LabelState> {
    /// Everything the terminal renderer shows.
    pub fn frame<'a>(&'a self, outcome: Option<&'a CycleOutcome>) -> Frame<'a> {
        Frame {
            device: self.device_port(),
            map: &self.map,
            label: self.label.text(),
            last_sentence: self.last_sentence.as_ref().map(RawSentence::as_str),
            last_update: self.last_update,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Result, TrackerError},
        geocode::UNKNOWN_LOCATION,
        gps::device::tests::{FakePort, FakeProvider, StallingReader},
    };
    use std::{
        io::Cursor,
        sync::{Arc, Mutex},
    };

    const VALID_RMC: &str = "$GNRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";

    #[derive(Default)]
    struct RecordingMap {
        calls: Vec<String>,
    }

    impl MapView for RecordingMap {
        fn set_center(&mut self, lat: f64, lon: f64) {
            self.calls.push(format!("center {:.4} {:.4}", lat, lon));
        }

        fn add_marker(&mut self, lat: f64, lon: f64) {
            self.calls.push(format!("marker {:.4} {:.4}", lat, lon));
        }
    }

    struct FixedGeocoder {
        answer: Option<&'static str>,
        calls: Arc<Mutex<usize>>,
    }

    impl ReverseGeocoder for FixedGeocoder {
        fn reverse(&self, _fix: &PositionFix) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            self.answer
                .map(str::to_string)
                .ok_or_else(|| TrackerError::Geocode("connection refused".to_string()))
        }
    }

    fn geocoder(answer: Option<&'static str>) -> (Box<dyn ReverseGeocoder + Send>, Arc<Mutex<usize>>) {
        let calls = Arc::new(Mutex::new(0));
        let geocoder = FixedGeocoder {
            answer,
            calls: Arc::clone(&calls),
        };
        (Box::new(geocoder), calls)
    }

    fn session_with(
        output: &str,
        answer: Option<&'static str>,
    ) -> (TrackerSession<RecordingMap, LabelState>, Arc<Mutex<usize>>) {
        let device = DeviceHandle::new("fake", Cursor::new(output.as_bytes().to_vec()));
        let (geocoder, calls) = geocoder(answer);
        let session = TrackerSession::new(Some(device), RecordingMap::default(), LabelState::new(), geocoder);
        (session, calls)
    }

    #[test]
    fn test_valid_fix_updates_map_then_label() {
        let (mut session, calls) = session_with(VALID_RMC, Some("Marienplatz, Munich"));

        let outcome = session.run_cycle();

        match outcome {
            CycleOutcome::Updated { fix, address } => {
                assert!((fix.latitude() - 48.1173).abs() < 1e-4);
                assert_eq!(address, Ok("Marienplatz, Munich".to_string()));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(
            session.map().calls,
            vec!["center 48.1173 11.5167", "marker 48.1173 11.5167"]
        );
        assert_eq!(session.label().text(), "Marienplatz, Munich");
        assert_eq!(*calls.lock().unwrap(), 1);
        assert!(session.last_update().is_some());
    }

    #[test]
    fn test_geocode_failure_still_moves_map() {
        let (mut session, _) = session_with(VALID_RMC, None);

        let outcome = session.run_cycle();

        assert!(matches!(outcome, CycleOutcome::Updated { address: Err(_), .. }));
        assert_eq!(session.map().calls.len(), 2);
        assert_eq!(session.label().text(), ERROR_LABEL);
    }

    #[test]
    fn test_unknown_location_passes_through() {
        let (mut session, _) = session_with(VALID_RMC, Some(UNKNOWN_LOCATION));
        session.run_cycle();
        assert_eq!(session.label().text(), UNKNOWN_LOCATION);
    }

    #[test]
    fn test_invalid_and_ignored_sentences_leave_views_alone() {
        let output = "$GNRMC,123519,V,4807.038,N,01131.000,E,,,,,\r\n\
                      $GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
        let (mut session, calls) = session_with(output, Some("x"));

        assert_eq!(session.run_cycle(), CycleOutcome::InvalidFix);
        assert_eq!(session.run_cycle(), CycleOutcome::Ignored);

        assert!(session.map().calls.is_empty());
        assert_eq!(session.label().text(), crate::display::INITIAL_LABEL);
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(session.last_sentence().unwrap().as_str().starts_with("$GPGGA"));
    }

    #[test]
    fn test_malformed_then_recovers() {
        let output = format!("$GNRMC,123519,A\r\n{}", VALID_RMC);
        let (mut session, _) = session_with(&output, Some("ok"));

        assert!(matches!(
            session.run_cycle(),
            CycleOutcome::Malformed(DecodeError::TooFewFields { found: 3 })
        ));
        assert!(matches!(session.run_cycle(), CycleOutcome::Updated { .. }));
    }

    #[test]
    fn test_cut_off_sentence_is_not_decoded() {
        let device = DeviceHandle::new(
            "fake",
            StallingReader {
                chunk: Some(b"$GNRMC,123519,A,4807.038,N,01131.000,"),
            },
        );
        let (geocoder, calls) = geocoder(Some("x"));
        let mut session = TrackerSession::new(Some(device), RecordingMap::default(), LabelState::new(), geocoder);

        assert_eq!(session.run_cycle(), CycleOutcome::NoSentence);
        assert!(session.map().calls.is_empty());
        assert!(session.last_sentence().is_none());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_exhausted_input_is_no_sentence() {
        let (mut session, _) = session_with("", Some("x"));
        assert_eq!(session.run_cycle(), CycleOutcome::NoSentence);
        assert!(session.last_sentence().is_none());
    }

    #[test]
    fn test_no_device_skips_reading() {
        let (geocoder, calls) = geocoder(Some("x"));
        let mut session = TrackerSession::new(None, RecordingMap::default(), LabelState::new(), geocoder);

        assert_eq!(session.run_cycle(), CycleOutcome::NoDevice);
        assert_eq!(session.run_cycle(), CycleOutcome::NoDevice);
        assert!(!session.has_device());
        assert!(session.map().calls.is_empty());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_start_runs_discovery() {
        let provider = FakeProvider::new(vec![
            ("/dev/ttyS0", FakePort::Busy),
            ("/dev/ttyUSB0", FakePort::Output("$GNRMC,1,V,,,,,,,,,,N*4D\r\n")),
        ]);
        let (geocoder, _) = geocoder(Some("x"));
        let session = TrackerSession::start(
            &provider,
            &LinkSettings::default(),
            MapState::default(),
            LabelState::new(),
            geocoder,
        );

        assert_eq!(session.device_port(), Some("/dev/ttyUSB0"));
        let frame = session.frame(None);
        assert_eq!(frame.device, Some("/dev/ttyUSB0"));
        assert_eq!(frame.label, crate::display::INITIAL_LABEL);
    }

    #[test]
    fn test_describe_outcomes() {
        assert_eq!(CycleOutcome::NoDevice.describe(), "No GPS device connected");
        assert_eq!(CycleOutcome::InvalidFix.describe(), "Data is not valid");
    }
}
