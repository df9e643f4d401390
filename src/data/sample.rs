/// One labelled training example.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub input: Vec<f64>,
    pub label: usize,
}

/// A decoded dataset row: the raw class byte and the normalized pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct MnistRow {
    pub label: u8,
    /// Row-major, each value `byte / 255.0`.
    pub pixels: Vec<f64>,
}

impl From<MnistRow> for Sample {
    fn from(row: MnistRow) -> Self {
        Sample { input: row.pixels, label: row.label as usize }
    }
}
