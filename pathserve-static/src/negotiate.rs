//! Accept-Encoding negotiation

/// Encodings the resolver knows how to choose between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    Deflate,
    Identity,
}

impl Encoding {
    /// Server preference, used to break quality ties
    const PREFERENCE: [Encoding; 3] = [Encoding::Gzip, Encoding::Deflate, Encoding::Identity];

    /// Get the content-encoding header value
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
            Encoding::Deflate => "deflate",
            Encoding::Identity => "identity",
        }
    }
}

/// Pick the best of gzip, deflate and identity for an Accept-Encoding value
///
/// Explicit entries win over `*`. Identity is implicitly acceptable at the
/// lowest listed quality unless named. Equal qualities fall back to server
/// preference. Returns `None` when nothing is acceptable.
pub fn preferred_encoding(accept: Option<&str>) -> Option<Encoding> {
    let entries = parse_accept_encoding(accept.unwrap_or(""));
    let lowest = entries
        .iter()
        .map(|(_, q)| *q)
        .fold(None, |min: Option<f32>, q| Some(min.map_or(q, |m| m.min(q))))
        .unwrap_or(1.0);
    let wildcard = entries.iter().find(|(name, _)| name == "*").map(|(_, q)| *q);

    let mut best: Option<(Encoding, f32)> = None;
    for encoding in Encoding::PREFERENCE {
        let explicit = entries
            .iter()
            .find(|(name, _)| name == encoding.as_str())
            .map(|(_, q)| *q);
        let quality = match (explicit, encoding) {
            (Some(q), _) => q,
            (None, Encoding::Identity) => lowest,
            (None, _) => wildcard.unwrap_or(0.0),
        };
        if quality <= 0.0 {
            continue;
        }
        if best.is_none_or(|(_, q)| quality > q) {
            best = Some((encoding, quality));
        }
    }
    best.map(|(encoding, _)| encoding)
}

/// Parse `name;q=value` entries, skipping malformed ones
fn parse_accept_encoding(header: &str) -> Vec<(String, f32)> {
    header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let name = parts.next()?.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            let mut quality = 1.0;
            for param in parts {
                let (key, value) = param.split_once('=')?;
                if key.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse::<f32>().ok()?;
                }
            }
            Some((name, quality))
        })
        .collect()
}
