/// Semantic class table shared by the dataset accessors and the exporters.
/// Class indices are positions in `CLASS_MAP`, not LAS classification codes.
pub struct ClassInfo {
    /// LAS classification code stored in the source clouds.
    pub id: u8,
    pub name: &'static str,
    /// Short label used for histogram axes and summaries.
    pub short_name: &'static str,
    /// Colour used when exporting clouds coloured by label.
    pub colour: [u8; 3],
}

pub const CLASS_MAP: &[ClassInfo] = &[
    ClassInfo {
        id: 0,
        name: "unclassified",
        short_name: "unclass",
        colour: [128, 128, 128],
    },
    ClassInfo {
        id: 2,
        name: "ground, sidewalk",
        short_name: "ground",
        colour: [196, 164, 132],
    },
    ClassInfo {
        id: 3,
        name: "vegetation - low",
        short_name: "veg_low",
        colour: [144, 238, 144],
    },
    ClassInfo {
        id: 4,
        name: "vegetation - medium",
        short_name: "veg_med",
        colour: [60, 179, 113],
    },
    ClassInfo {
        id: 5,
        name: "vegetation - high",
        short_name: "veg_high",
        colour: [0, 100, 0],
    },
    ClassInfo {
        id: 6,
        name: "buildings",
        short_name: "building",
        colour: [220, 20, 60],
    },
    ClassInfo {
        id: 8,
        name: "street furniture",
        short_name: "furniture",
        colour: [255, 165, 0],
    },
    ClassInfo {
        id: 11,
        name: "street pavement",
        short_name: "pavement",
        colour: [70, 70, 70],
    },
    ClassInfo {
        id: 15,
        name: "cars, trucks",
        short_name: "vehicle",
        colour: [30, 144, 255],
    },
];

/// Colour for indices outside the class table.
pub const UNKNOWN_CLASS_COLOUR: [u8; 3] = [255, 0, 255];

pub fn num_classes() -> usize {
    CLASS_MAP.len()
}

/// Map a LAS classification code to its class index.
/// Codes missing from the table are folded into "unclassified".
pub fn class_index(id: u8) -> usize {
    CLASS_MAP.iter().position(|c| c.id == id).unwrap_or(0)
}

pub fn get_class_name(index: usize) -> String {
    CLASS_MAP
        .get(index)
        .map_or("unknown", |c| c.name)
        .to_string()
}

pub fn short_label_names() -> Vec<String> {
    CLASS_MAP.iter().map(|c| c.short_name.to_string()).collect()
}

pub fn label_colour(index: usize) -> [u8; 3] {
    CLASS_MAP
        .get(index)
        .map_or(UNKNOWN_CLASS_COLOUR, |c| c.colour)
}
