use url::form_urlencoded;

/// Parameters a document reads from its URL query string at boot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BootParams {
    /// `riv`: source override.
    pub source: Option<String>,
    /// `artboard` / `ab`.
    pub artboard: Option<String>,
    /// `sm` / `statemachine`.
    pub state_machine: Option<String>,
    /// `startMs`.
    pub start_ms: Option<u64>,
    /// `outAfterMs`.
    pub out_after_ms: Option<u64>,
    /// `clearAfterMs`.
    pub clear_after_ms: Option<u64>,
    /// `vm.<Name>=<value>` overrides in query order, keyed by the literal name.
    pub values: Vec<(String, String)>,
}

impl BootParams {
    /// Parse a query string, with or without the leading `?`.
    ///
    /// The first occurrence of a key wins. Non-numeric or negative timer values are ignored.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut out = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "riv" => set_once(&mut out.source, value),
                "artboard" | "ab" => set_once(&mut out.artboard, value),
                "sm" | "statemachine" => set_once(&mut out.state_machine, value),
                "startMs" => set_ms(&mut out.start_ms, &key, &value),
                "outAfterMs" => set_ms(&mut out.out_after_ms, &key, &value),
                "clearAfterMs" => set_ms(&mut out.clear_after_ms, &key, &value),
                k => {
                    if let Some(name) = k.strip_prefix("vm.")
                        && !name.is_empty()
                    {
                        if out.value(name).is_none() {
                            out.values.push((name.to_string(), value));
                        }
                    }
                }
            }
        }
        out
    }

    /// Override for the literal property `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

fn set_once(slot: &mut Option<String>, value: String) {
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value);
    }
}

fn set_ms(slot: &mut Option<u64>, key: &str, value: &str) {
    if slot.is_some() {
        return;
    }
    match value.trim().parse::<f64>() {
        Ok(ms) if ms.is_finite() && ms >= 0.0 => *slot = Some(ms as u64),
        _ => tracing::warn!(key, value, "ignoring invalid timer parameter"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_every_boot_parameter() {
        let p = BootParams::from_query(
            "?riv=clips%2Flower+third.riv&ab=Main&statemachine=SM&startMs=250&outAfterMs=4000\
             &clearAfterMs=500&vm.Title=Hello+World&vm.Accent=%23FF8800",
        );
        assert_eq!(p.source.as_deref(), Some("clips/lower third.riv"));
        assert_eq!(p.artboard.as_deref(), Some("Main"));
        assert_eq!(p.state_machine.as_deref(), Some("SM"));
        assert_eq!(
            (p.start_ms, p.out_after_ms, p.clear_after_ms),
            (Some(250), Some(4000), Some(500))
        );
        assert_eq!(p.value("Title"), Some("Hello World"));
        assert_eq!(p.value("Accent"), Some("#FF8800"));
        assert_eq!(p.values[0].0, "Title");
    }

    #[test]
    fn malformed_escapes_stay_literal_and_bad_timers_are_dropped() {
        let p = BootParams::from_query("vm.Pct=100%&startMs=soon&outAfterMs=-5&vm.=x");
        assert_eq!(p.value("Pct"), Some("100%"));
        assert_eq!(p.values.len(), 1);
        assert_eq!(p.start_ms, None);
        assert_eq!(p.out_after_ms, None);
    }

    #[test]
    fn first_occurrence_wins() {
        let p = BootParams::from_query("artboard=A&ab=B&vm.X=1&vm.X=2");
        assert_eq!(p.artboard.as_deref(), Some("A"));
        assert_eq!(p.value("X"), Some("1"));
        assert_eq!(p.values.len(), 1);
    }
}
