use crate::host::Host;

/// Display preset. Colors feed the terminal renderer; the remaining fields
/// are forwarded to the display as named parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub foreground: (u8, u8, u8),
    pub background: (u8, u8, u8),
    pub glow: f32,
    pub curvature: f32,
    pub scanlines: f32,
}

pub const THEMES: &[Theme] = &[
    Theme {
        name: "green",
        foreground: (51, 255, 102),
        background: (4, 16, 8),
        glow: 0.6,
        curvature: 0.12,
        scanlines: 0.35,
    },
    Theme {
        name: "amber",
        foreground: (255, 176, 0),
        background: (20, 12, 0),
        glow: 0.55,
        curvature: 0.12,
        scanlines: 0.35,
    },
    Theme {
        name: "white",
        foreground: (230, 230, 230),
        background: (10, 10, 12),
        glow: 0.4,
        curvature: 0.08,
        scanlines: 0.25,
    },
    Theme {
        name: "cyan",
        foreground: (0, 230, 255),
        background: (0, 12, 20),
        glow: 0.5,
        curvature: 0.1,
        scanlines: 0.3,
    },
    Theme {
        name: "flat",
        foreground: (200, 200, 200),
        background: (0, 0, 0),
        glow: 0.0,
        curvature: 0.0,
        scanlines: 0.0,
    },
];

impl Theme {
    /// Push this preset's parameters to the display.
    pub fn apply(&self, host: &mut dyn Host) {
        host.set_param("glow", self.glow);
        host.set_param("curvature", self.curvature);
        host.set_param("scanlines", self.scanlines);
    }
}

/// Index of the preset called `name`, ignoring case.
pub fn find(name: &str) -> Option<usize> {
    THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RecordingHost;

    #[test]
    fn find_is_case_insensitive() {
        assert_eq!(find("AMBER"), Some(1));
        assert_eq!(find("nope"), None);
    }

    #[test]
    fn apply_sets_every_display_param() {
        let mut host = RecordingHost::default();
        THEMES[0].apply(&mut host);
        let names: Vec<String> = host.params().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["glow", "curvature", "scanlines"]);
    }
}
