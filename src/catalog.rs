//! Fixed catalogs for newspapers, clubs, and annotation label classes.
//!
//! Every table in this module is an immutable enum-backed lookup built into
//! the binary; nothing here is configurable at runtime. Ordering matters:
//! label ids double as palette indices in the calendar and month renders,
//! so the numeric ids must stay exactly as the annotation files expect them.
//!
//! # Id assignments
//!
//! | Label class | Id | Tracked club | Color |
//! |-------------|----|--------------|-------|
//! | Background  | 0  | –            | –     |
//! | Benfica     | 1  | yes          | red   |
//! | Porto       | 2  | yes          | blue  |
//! | Sporting    | 3  | yes          | green |
//! | Pub (ads)   | 4  | –            | –     |
//! | Other       | 5  | yes          | gray  |

/// Portuguese month abbreviations used as x-axis labels in the plots.
pub const PT_MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Portuguese weekday abbreviations, Monday first, used as y-axis labels.
pub const PT_DAY_LABELS: [&str; 7] = ["Seg", "Ter", "Qua", "Qui", "Sex", "Sab", "Dom"];

/// Object classes that may appear in a cover annotation file.
///
/// The discriminants are the numeric ids stored in cover records and used
/// to index the color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LabelClass {
    /// Anything that is not a labelled box.
    Background = 0,
    Benfica = 1,
    Porto = 2,
    Sporting = 3,
    /// Advertisements ("publicidade").
    Pub = 4,
    /// Sports content not attributable to one of the three tracked clubs.
    Other = 5,
}

impl LabelClass {
    /// All classes in id order.
    pub const ALL: [LabelClass; 6] = [
        LabelClass::Background,
        LabelClass::Benfica,
        LabelClass::Porto,
        LabelClass::Sporting,
        LabelClass::Pub,
        LabelClass::Other,
    ];

    /// The numeric id stored in tables and annotation-derived records.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Upper-case symbolic name, matching the annotation files' `<name>`
    /// values after upper-casing.
    pub fn name(self) -> &'static str {
        match self {
            LabelClass::Background => "BACKGROUND",
            LabelClass::Benfica => "BENFICA",
            LabelClass::Porto => "PORTO",
            LabelClass::Sporting => "SPORTING",
            LabelClass::Pub => "PUB",
            LabelClass::Other => "OTHER",
        }
    }

    /// Resolve an annotation object name, case-insensitively.
    ///
    /// Returns `None` for names outside the catalog; the dataset loader
    /// treats that as a fatal data-integrity error rather than skipping
    /// the object.
    pub fn from_name(name: &str) -> Option<LabelClass> {
        let upper = name.to_uppercase();
        LabelClass::ALL.into_iter().find(|c| c.name() == upper)
    }
}

/// The tracked clubs (plus the catch-all "other"), i.e. the subset of
/// [`LabelClass`] that the reports aggregate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Club {
    Benfica,
    Porto,
    Sporting,
    Other,
}

impl Club {
    /// All clubs in report order: Benfica, Porto, Sporting, Other.
    pub const ALL: [Club; 4] = [Club::Benfica, Club::Porto, Club::Sporting, Club::Other];

    /// The clubs with a match-results presence; `Other` has no fixtures.
    pub const WITH_GAMES: [Club; 3] = [Club::Benfica, Club::Porto, Club::Sporting];

    /// The label-class ids of the clubs, in report order: `[1, 2, 3, 5]`.
    pub fn ids() -> [u8; 4] {
        [
            Club::Benfica.label().id(),
            Club::Porto.label().id(),
            Club::Sporting.label().id(),
            Club::Other.label().id(),
        ]
    }

    /// The label class carrying this club's id.
    pub fn label(self) -> LabelClass {
        match self {
            Club::Benfica => LabelClass::Benfica,
            Club::Porto => LabelClass::Porto,
            Club::Sporting => LabelClass::Sporting,
            Club::Other => LabelClass::Other,
        }
    }

    /// Display name as it appears in the match-results feed and reports.
    pub fn name(self) -> &'static str {
        match self {
            Club::Benfica => "Benfica",
            Club::Porto => "Porto",
            Club::Sporting => "Sporting",
            Club::Other => "Other",
        }
    }

    /// Plot color (RGB), fixed per club across every render.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Club::Benfica => (255, 0, 0),
            Club::Porto => (0, 0, 255),
            Club::Sporting => (0, 128, 0),
            Club::Other => (128, 128, 128),
        }
    }

    /// Reverse lookup from a label id, for palette indexing.
    pub fn from_label_id(id: u8) -> Option<Club> {
        Club::ALL.into_iter().find(|c| c.label().id() == id)
    }
}

/// The three crawled sports dailies.
///
/// Declaration order is the display order of the stacked calendar panels
/// and the month panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Newspaper {
    Abola,
    Record,
    Ojogo,
}

impl Newspaper {
    /// All newspapers in display order.
    pub const ALL: [Newspaper; 3] = [Newspaper::Abola, Newspaper::Record, Newspaper::Ojogo];

    /// Display name; also the stem prefix of crawled cover files.
    pub fn name(self) -> &'static str {
        match self {
            Newspaper::Abola => "Abola",
            Newspaper::Record => "Record",
            Newspaper::Ojogo => "Ojogo",
        }
    }

    /// Lower-case key used in the cover table's `newspaper` column.
    pub fn table_key(self) -> &'static str {
        match self {
            Newspaper::Abola => "abola",
            Newspaper::Record => "record",
            Newspaper::Ojogo => "ojogo",
        }
    }

    /// The numeric identifier the SAPO 24 kiosk assigns to this title,
    /// used when building cover-page URLs.
    pub fn site_id(self) -> u32 {
        match self {
            Newspaper::Abola => 4137,
            Newspaper::Record => 4139,
            Newspaper::Ojogo => 4138,
        }
    }

    /// Case-insensitive parse of a newspaper name, for CLI arguments.
    pub fn from_key(key: &str) -> Option<Newspaper> {
        let lower = key.to_lowercase();
        Newspaper::ALL.into_iter().find(|n| n.table_key() == lower)
    }
}

/// Cover image sizes published by the kiosk.
///
/// The crawler matches these against the `W={w}&H={h}` fragments embedded
/// in the page's `srcset` descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    R320x398,
    R640x795,
    R910x1131,
    R870x1081,
    R1050x1305,
}

impl Resolution {
    /// All known sizes.
    pub const ALL: [Resolution; 5] = [
        Resolution::R320x398,
        Resolution::R640x795,
        Resolution::R910x1131,
        Resolution::R870x1081,
        Resolution::R1050x1305,
    ];

    /// Width in pixels.
    pub fn width(self) -> u32 {
        self.dims().0
    }

    /// Height in pixels.
    pub fn height(self) -> u32 {
        self.dims().1
    }

    fn dims(self) -> (u32, u32) {
        match self {
            Resolution::R320x398 => (320, 398),
            Resolution::R640x795 => (640, 795),
            Resolution::R910x1131 => (910, 1131),
            Resolution::R870x1081 => (870, 1081),
            Resolution::R1050x1305 => (1050, 1305),
        }
    }

    /// The query fragment the kiosk embeds in `srcset` size descriptors.
    pub fn query_fragment(self) -> String {
        format!("W={}&H={}", self.width(), self.height())
    }

    /// Look up a catalog entry from explicit dimensions (CLI `WxH` input).
    pub fn from_dims(width: u32, height: u32) -> Option<Resolution> {
        Resolution::ALL.into_iter().find(|r| r.dims() == (width, height))
    }
}
