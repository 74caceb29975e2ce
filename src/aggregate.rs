use crate::parse::InterfaceCounterRecord;

/// The error counters that are summed across a device's interfaces.
/// Declaration order is the order they are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    Ignored,
    InputErrors,
    Collisions,
    Frame,
    Crc,
    InterfaceResets,
    OutputErrors,
    Overrun,
}

impl CounterKind {
    pub const ALL: [CounterKind; 8] = [
        CounterKind::Ignored,
        CounterKind::InputErrors,
        CounterKind::Collisions,
        CounterKind::Frame,
        CounterKind::Crc,
        CounterKind::InterfaceResets,
        CounterKind::OutputErrors,
        CounterKind::Overrun,
    ];

    /// Label as printed by the device
    pub fn label(self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::InputErrors => "input errors",
            Self::Collisions => "collisions",
            Self::Frame => "frame",
            Self::Crc => "CRC",
            Self::InterfaceResets => "interface resets",
            Self::OutputErrors => "output errors",
            Self::Overrun => "overrun",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for CounterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Sum of one counter and the interfaces that reported a nonzero value for it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterTally {
    pub total: u64,
    pub interfaces: Vec<String>,
}

/// Per-device error counter totals with provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedCounters {
    pub device: String,
    tallies: [CounterTally; 8],
}

impl AggregatedCounters {
    pub fn new(device: &str) -> Self {
        Self {
            device: device.to_string(),
            ..Default::default()
        }
    }

    /// Fold one interface's counters in. Unrecognized labels and zero values
    /// are ignored.
    pub fn add(&mut self, record: &InterfaceCounterRecord) {
        for (label, &value) in &record.counters {
            let Some(kind) = CounterKind::from_label(label) else {
                continue;
            };
            if value == 0 {
                continue;
            }

            let tally = &mut self.tallies[kind.index()];
            tally.total = tally.total.saturating_add(value);
            tally.interfaces.push(record.interface.clone());
        }
    }

    pub fn tally(&self, kind: CounterKind) -> &CounterTally {
        &self.tallies[kind.index()]
    }

    #[cfg(test)]
    pub fn total(&self, kind: CounterKind) -> u64 {
        self.tally(kind).total
    }

    #[cfg(test)]
    pub fn contributors(&self, kind: CounterKind) -> &[String] {
        &self.tally(kind).interfaces
    }

    /// Nonzero counters in reporting order
    pub fn nonzero(&self) -> impl Iterator<Item = (CounterKind, &CounterTally)> {
        CounterKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.tally(kind)))
            .filter(|(_, tally)| tally.total != 0)
    }

    /// True when at least one recognized counter is nonzero
    pub fn is_changed(&self) -> bool {
        self.nonzero().next().is_some()
    }
}

/// Build a device's counter summary from its per-interface records.
pub fn aggregate(device: &str, records: &[InterfaceCounterRecord]) -> AggregatedCounters {
    let mut aggregated = AggregatedCounters::new(device);
    for record in records {
        aggregated.add(record);
    }
    aggregated
}
