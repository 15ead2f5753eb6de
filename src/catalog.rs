//! Static catalogs of presentation templates and color schemes.

pub const DEFAULT_TEMPLATE: &str = "executive";
pub const DEFAULT_COLOR_SCHEME: &str = "ocean";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub id: &'static str,
    pub name: &'static str,
    pub primary: &'static str,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        id: "executive",
        name: "Executive Brief",
        description: "Clean, corporate design for business presentations",
    },
    Template {
        id: "modern-minimal",
        name: "Modern Minimal",
        description: "Sleek and contemporary with bold typography",
    },
    Template {
        id: "vibrant-creative",
        name: "Vibrant Creative",
        description: "Colorful and energetic for creative projects",
    },
    Template {
        id: "academic",
        name: "Academic Pro",
        description: "Professional layout for educational content",
    },
    Template {
        id: "tech-startup",
        name: "Tech Startup",
        description: "Bold gradients perfect for tech presentations",
    },
    Template {
        id: "elegant-dark",
        name: "Elegant Dark",
        description: "Sophisticated dark theme with gold accents",
    },
    Template {
        id: "detailed-brief",
        name: "Detailed Brief",
        description: "Comprehensive overview with detailed topic information",
    },
];

pub const COLOR_SCHEMES: &[ColorScheme] = &[
    ColorScheme {
        id: "ocean",
        name: "Ocean Blue",
        primary: "#0ea5e9",
    },
    ColorScheme {
        id: "forest",
        name: "Forest Green",
        primary: "#10b981",
    },
    ColorScheme {
        id: "sunset",
        name: "Sunset Orange",
        primary: "#f97316",
    },
    ColorScheme {
        id: "royal",
        name: "Royal Purple",
        primary: "#9333ea",
    },
    ColorScheme {
        id: "rose",
        name: "Rose Pink",
        primary: "#ec4899",
    },
    ColorScheme {
        id: "amber",
        name: "Amber Gold",
        primary: "#f59e0b",
    },
    ColorScheme {
        id: "teal",
        name: "Teal Aqua",
        primary: "#14b8a6",
    },
    ColorScheme {
        id: "crimson",
        name: "Crimson Red",
        primary: "#dc2626",
    },
    ColorScheme {
        id: "slate",
        name: "Slate Gray",
        primary: "#475569",
    },
    ColorScheme {
        id: "violet",
        name: "Deep Violet",
        primary: "#7c3aed",
    },
];

pub fn template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

pub fn color_scheme(id: &str) -> Option<&'static ColorScheme> {
    COLOR_SCHEMES.iter().find(|c| c.id == id)
}
