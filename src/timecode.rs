use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A canonical `HH:MM:SS[.mmm]` timestamp.
///
/// Why this exists:
/// - Time text reaches us from several unreliable places (subtitle tracks, model replies,
///   hand-edited JSON), each with its own quirks: enclosing brackets, `,mmm` millisecond
///   suffixes, missing hour fields.
/// - Normalizing once, at the boundary, means everything downstream (prompt rendering,
///   cutting, persistence) can assume a single shape.
///
/// A `Timecode` is only constructed through [`Timecode::normalize`], so holding one is
/// proof the text split into valid colon-separated components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timecode(String);

impl Timecode {
    /// Normalize heterogeneous time text into the canonical form.
    ///
    /// Rules, in order:
    /// - strip enclosing bracket characters (`[01:02:03]` → `01:02:03`)
    /// - drop a millisecond suffix by splitting on the first comma (`01:02:03,456` → `01:02:03`)
    /// - left-pad a two-component `MM:SS` with a `"00"` hours field
    ///
    /// Components are kept textually as-is; we validate them but do not re-pad.
    /// Fails with [`Error::MalformedTimecode`] when the input does not split into
    /// 2 or 3 colon-separated numeric components.
    pub fn normalize(raw: &str) -> Result<Self> {
        let stripped = raw.trim().trim_matches(|c| c == '[' || c == ']');

        // SRT-style millisecond suffixes use a comma; everything after it is dropped.
        let stripped = stripped.split(',').next().unwrap_or_default();

        let mut parts: Vec<&str> = stripped.split(':').map(str::trim).collect();
        match parts.len() {
            2 => parts.insert(0, "00"),
            3 => {}
            _ => return Err(Error::MalformedTimecode(raw.to_string())),
        }

        let numeric = parts[0].parse::<u64>().is_ok()
            && parts[1].parse::<u64>().is_ok()
            && parts[2].parse::<f64>().is_ok_and(|s| s >= 0.0);
        if !numeric {
            return Err(Error::MalformedTimecode(raw.to_string()));
        }

        Ok(Self(parts.join(":")))
    }

    /// Convert to total seconds (`hours * 3600 + minutes * 60 + seconds`).
    ///
    /// A fractional `SS.mmm` component contributes its fraction. Fails with
    /// [`Error::MalformedTimecode`] on non-numeric components, which can only happen
    /// to values deserialized from hand-edited files.
    pub fn seconds(&self) -> Result<f64> {
        let parts: Vec<&str> = self.0.split(':').collect();
        if parts.len() != 3 {
            return Err(Error::MalformedTimecode(self.0.clone()));
        }

        let mut total = 0.0;
        for part in &parts {
            let component: f64 = part
                .parse()
                .map_err(|_| Error::MalformedTimecode(self.0.clone()))?;
            total = total * 60.0 + component;
        }

        Ok(total)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
