use crate::aggregate::AggregatedCounters;
use crate::classify::ClassificationResult;
use crate::config::SinkNames;
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Format of the header line each sink starts with
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// `<device>: <if1>, <if2>, ...`, or nothing when there are no interfaces
pub fn render_interface_line(device: &str, interfaces: &[String]) -> Option<String> {
    if interfaces.is_empty() {
        return None;
    }
    Some(format!("{}: {}", device, interfaces.join(", ")))
}

/// Counter section for one device; empty when no recognized counter is nonzero.
pub fn render_counter_block(counters: &AggregatedCounters) -> Vec<String> {
    if !counters.is_changed() {
        return Vec::new();
    }

    let mut lines = vec![format!(
        "On {} the following error counters were detected:",
        counters.device
    )];
    lines.extend(counters.nonzero().map(|(kind, tally)| {
        format!(
            "- {} {} in total, counted on: {}",
            tally.total,
            kind,
            tally.interfaces.join(", ")
        )
    }));
    lines
}

/// Appends report lines to the healthy, degraded and counters sinks.
pub struct ReportWriter<W: Write> {
    healthy: W,
    degraded: W,
    counters: W,
}

impl ReportWriter<File> {
    /// Create (truncating) the three sink files inside `dir`
    pub fn create_files(dir: &Path, names: &SinkNames) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self::new(
            File::create(dir.join(&names.healthy))?,
            File::create(dir.join(&names.degraded))?,
            File::create(dir.join(&names.counters))?,
        ))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(healthy: W, degraded: W, counters: W) -> Self {
        Self {
            healthy,
            degraded,
            counters,
        }
    }

    /// Write the `[timestamp]` header to every sink. Called once per run.
    pub fn begin(&mut self, started: NaiveDateTime) -> io::Result<()> {
        let header = format!("[{}]", started.format(TIMESTAMP_FORMAT));
        for sink in [&mut self.healthy, &mut self.degraded, &mut self.counters] {
            writeln!(sink, "{}", header)?;
            sink.flush()?;
        }
        Ok(())
    }

    pub fn write_classification(&mut self, result: &ClassificationResult) -> io::Result<()> {
        if let Some(line) = render_interface_line(&result.device, &result.healthy) {
            writeln!(self.healthy, "{}", line)?;
            self.healthy.flush()?;
        }
        if let Some(line) = render_interface_line(&result.device, &result.degraded) {
            writeln!(self.degraded, "{}", line)?;
            self.degraded.flush()?;
        }
        Ok(())
    }

    pub fn write_counters(&mut self, counters: &AggregatedCounters) -> io::Result<()> {
        let lines = render_counter_block(counters);
        if lines.is_empty() {
            return Ok(());
        }
        for line in lines {
            writeln!(self.counters, "{}", line)?;
        }
        self.counters.flush()
    }

    /// Give back the sinks as (healthy, degraded, counters)
    #[cfg(test)]
    pub fn into_inner(self) -> (W, W, W) {
        (self.healthy, self.degraded, self.counters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::parse::InterfaceCounterRecord;
    use chrono::NaiveDate;

    fn started() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 6, 1)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    fn memory_writer() -> ReportWriter<Vec<u8>> {
        ReportWriter::new(Vec::new(), Vec::new(), Vec::new())
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    fn record(interface: &str, values: &[(&str, u64)]) -> InterfaceCounterRecord {
        InterfaceCounterRecord {
            device: "r1".into(),
            interface: interface.into(),
            counters: values.iter().map(|(l, v)| (l.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn test_render_interface_line() {
        let interfaces = vec!["Gi1".to_string(), "Gi2".to_string()];
        assert_eq!(
            render_interface_line("10.0.0.1", &interfaces).as_deref(),
            Some("10.0.0.1: Gi1, Gi2")
        );
        assert_eq!(render_interface_line("10.0.0.1", &[]), None);
    }

    #[test]
    fn test_render_counter_block_format() {
        let aggregated = aggregate(
            "10.0.0.1",
            &[
                record("Gi1", &[("CRC", 3), ("input errors", 3)]),
                record("Gi2", &[("CRC", 2), ("babbles", 4)]),
            ],
        );
        assert_eq!(
            render_counter_block(&aggregated),
            vec![
                "On 10.0.0.1 the following error counters were detected:",
                "- 3 input errors in total, counted on: Gi1",
                "- 5 CRC in total, counted on: Gi1, Gi2",
            ]
        );
    }

    #[test]
    fn test_render_counter_block_unchanged_is_empty() {
        let aggregated = aggregate("r1", &[record("Gi1", &[("CRC", 0)])]);
        assert!(render_counter_block(&aggregated).is_empty());
    }

    #[test]
    fn test_begin_writes_timestamp_header_to_every_sink() {
        let mut writer = memory_writer();
        writer.begin(started()).unwrap();
        let (healthy, degraded, counters) = writer.into_inner();
        for sink in [healthy, degraded, counters] {
            assert_eq!(text(sink), "[2020-06-01 09:05]\n");
        }
    }

    #[test]
    fn test_write_classification_skips_empty_lists() {
        let mut writer = memory_writer();
        writer
            .write_classification(&ClassificationResult {
                device: "r1".into(),
                healthy: vec!["Gi1".into(), "Gi3".into()],
                degraded: vec![],
            })
            .unwrap();
        let (healthy, degraded, counters) = writer.into_inner();
        assert_eq!(text(healthy), "r1: Gi1, Gi3\n");
        assert!(degraded.is_empty());
        assert!(counters.is_empty());
    }

    #[test]
    fn test_write_counters_unchanged_writes_nothing() {
        let mut writer = memory_writer();
        writer.write_counters(&aggregate("r1", &[])).unwrap();
        let (_, _, sink) = writer.into_inner();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_create_files_truncates_existing_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let names = SinkNames::default();
        std::fs::write(dir.path().join(&names.healthy), "stale data\n").unwrap();

        let mut writer = ReportWriter::create_files(dir.path(), &names).unwrap();
        writer.begin(started()).unwrap();
        drop(writer);

        let healthy = std::fs::read_to_string(dir.path().join(&names.healthy)).unwrap();
        assert_eq!(healthy, "[2020-06-01 09:05]\n");
        assert!(dir.path().join(&names.degraded).exists());
        assert!(dir.path().join(&names.counters).exists());
    }
}
