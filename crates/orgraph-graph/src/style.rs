//! Graph View Style System
//!
//! Colour and stroke tables for nodes and edges. Every `RelationKind` has an
//! entry; unknown backend strings parse to `Other` and take its style.

use orgraph_core::{NodeKind, RelationKind};

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) * (1.0 - factor)) as u8,
            g: ((self.g as f32) * (1.0 - factor)) as u8,
            b: ((self.b as f32) * (1.0 - factor)) as u8,
            a: self.a,
        }
    }

    pub fn lighten(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) + (255.0 - self.r as f32) * factor) as u8,
            g: ((self.g as f32) + (255.0 - self.g as f32) * factor) as u8,
            b: ((self.b as f32) + (255.0 - self.b as f32) * factor) as u8,
            a: self.a,
        }
    }
}

/// Edge stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStyle {
    pub color: Color,
    pub width: f32,
    /// Dash and gap lengths; `None` is a solid line
    pub dash: Option<[f32; 2]>,
    /// Marching-ants animation along the edge
    pub animated: bool,
    pub arrow_head: bool,
}

impl EdgeStyle {
    const fn solid(color: Color) -> Self {
        Self {
            color,
            width: 2.0,
            dash: None,
            animated: false,
            arrow_head: true,
        }
    }

    const fn dashed(color: Color, dash: [f32; 2]) -> Self {
        Self {
            color,
            width: 2.0,
            dash: Some(dash),
            animated: false,
            arrow_head: true,
        }
    }

    pub fn is_dashed(&self) -> bool {
        self.dash.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeColors {
    pub fill: Color,
    pub border: Color,
    pub text: Color,
    pub secondary_text: Color,
}

/// Complete style for a graph node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub colors: NodeColors,
    pub corner_radius: f32,
    pub font_size: f32,
    pub font_bold: bool,
    pub min_width: f32,
    pub min_height: f32,
    pub icon: Option<&'static str>,
}

// Relation colors
pub const COLOR_EDGE_MANAGER: Color = Color::rgb(0xff, 0x8a, 0x00);
pub const COLOR_EDGE_DEPARTMENT: Color = Color::rgb(0xff, 0xff, 0xff);
pub const COLOR_EDGE_FUNCTIONAL: Color = Color::rgb(0x00, 0xb3, 0xff);
pub const COLOR_EDGE_ADMINISTRATIVE: Color = Color::rgb(0x4c, 0xaf, 0x50);
pub const COLOR_EDGE_PROJECT: Color = Color::rgb(0xff, 0x98, 0x00);
pub const COLOR_EDGE_TERRITORIAL: Color = Color::rgb(0x9c, 0x27, 0xb0);
pub const COLOR_EDGE_MENTORING: Color = Color::rgb(0x03, 0xa9, 0xf4);
pub const COLOR_EDGE_STRATEGIC: Color = Color::rgb(0xe9, 0x1e, 0x63);
pub const COLOR_EDGE_GOVERNANCE: Color = Color::rgb(0x60, 0x7d, 0x8b);
pub const COLOR_EDGE_ADVISORY: Color = Color::rgb(0x00, 0x96, 0x88);
pub const COLOR_EDGE_SUPERVISORY: Color = Color::rgb(0x79, 0x55, 0x48);
pub const COLOR_EDGE_OTHER: Color = Color::rgb(0x9d, 0x6a, 0xf5);

// Node palette (dark canvas)
pub const COLOR_CANVAS: Color = Color::rgb(0x1a, 0x1a, 0x1e);
pub const COLOR_NODE_TEXT: Color = Color::rgb(0xff, 0xff, 0xff);
pub const COLOR_NODE_SECONDARY_TEXT: Color = Color::rgb(0xcc, 0xcc, 0xcc);
pub const COLOR_STAFF_FILL: Color = Color::rgb(0x2a, 0x2a, 0x30);
pub const COLOR_UNIT_FILL: Color = Color::rgb(0x25, 0x2d, 0x3a);
pub const COLOR_LEGAL_FILL: Color = Color::rgb(0x2d, 0x27, 0x3a);
pub const COLOR_LOCATION_FILL: Color = Color::rgb(0x24, 0x33, 0x2c);
pub const COLOR_SELECTION: Color = Color::rgb(0xb3, 0x50, 0xff);
pub const COLOR_COMMENT_BADGE: Color = Color::rgb(0xf4, 0x43, 0x36);

pub fn get_edge_style(kind: RelationKind) -> EdgeStyle {
    match kind {
        RelationKind::Manager => EdgeStyle::solid(COLOR_EDGE_MANAGER),
        RelationKind::Department => EdgeStyle::solid(COLOR_EDGE_DEPARTMENT),
        RelationKind::Functional => EdgeStyle {
            animated: true,
            ..EdgeStyle::dashed(COLOR_EDGE_FUNCTIONAL, [6.0, 4.0])
        },
        RelationKind::Administrative => EdgeStyle::solid(COLOR_EDGE_ADMINISTRATIVE),
        RelationKind::Project => EdgeStyle::dashed(COLOR_EDGE_PROJECT, [8.0, 4.0]),
        RelationKind::Territorial => EdgeStyle::solid(COLOR_EDGE_TERRITORIAL),
        RelationKind::Mentoring => EdgeStyle::dashed(COLOR_EDGE_MENTORING, [2.0, 4.0]),
        RelationKind::Strategic => EdgeStyle::dashed(COLOR_EDGE_STRATEGIC, [10.0, 4.0]),
        RelationKind::Governance => EdgeStyle {
            width: 3.0,
            ..EdgeStyle::solid(COLOR_EDGE_GOVERNANCE)
        },
        RelationKind::Advisory => EdgeStyle::dashed(COLOR_EDGE_ADVISORY, [4.0, 4.0]),
        RelationKind::Supervisory => EdgeStyle {
            width: 2.5,
            ..EdgeStyle::solid(COLOR_EDGE_SUPERVISORY)
        },
        RelationKind::Other => EdgeStyle::solid(COLOR_EDGE_OTHER),
    }
}

/// Human-readable label for legends and tooltips.
pub fn get_edge_kind_label(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Manager => "Manager",
        RelationKind::Department => "Department",
        RelationKind::Functional => "Functional",
        RelationKind::Administrative => "Administrative",
        RelationKind::Project => "Project",
        RelationKind::Territorial => "Territorial",
        RelationKind::Mentoring => "Mentoring",
        RelationKind::Strategic => "Strategic",
        RelationKind::Governance => "Governance",
        RelationKind::Advisory => "Advisory",
        RelationKind::Supervisory => "Supervisory",
        RelationKind::Other => "Other",
    }
}

pub fn get_kind_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::OrganizationalUnit => "Division",
        NodeKind::Staff => "Employee",
        NodeKind::LegalEntity => "Legal entity",
        NodeKind::Location => "Location",
    }
}

pub fn get_node_colors(kind: NodeKind) -> NodeColors {
    let fill = match kind {
        NodeKind::OrganizationalUnit => COLOR_UNIT_FILL,
        NodeKind::Staff => COLOR_STAFF_FILL,
        NodeKind::LegalEntity => COLOR_LEGAL_FILL,
        NodeKind::Location => COLOR_LOCATION_FILL,
    };
    NodeColors {
        fill,
        border: COLOR_EDGE_OTHER,
        text: COLOR_NODE_TEXT,
        secondary_text: COLOR_NODE_SECONDARY_TEXT,
    }
}

pub fn get_node_style(kind: NodeKind) -> NodeStyle {
    let (min_width, min_height, icon) = match kind {
        NodeKind::Staff => (220.0, 90.0, Some("person")),
        NodeKind::OrganizationalUnit => (240.0, 70.0, Some("apartment")),
        NodeKind::LegalEntity => (240.0, 70.0, Some("business")),
        NodeKind::Location => (220.0, 70.0, Some("place")),
    };
    NodeStyle {
        colors: get_node_colors(kind),
        corner_radius: 8.0,
        font_size: 14.0,
        font_bold: kind != NodeKind::Staff,
        min_width,
        min_height,
        icon,
    }
}

/// Border follows the kind of the first incoming edge; roots keep the
/// default accent.
pub fn get_node_border_color(incoming: Option<RelationKind>) -> Color {
    incoming
        .map(|kind| get_edge_style(kind).color)
        .unwrap_or(COLOR_EDGE_OTHER)
}

/// Faded rendering for records marked inactive in the backend.
pub fn inactive_style(style: &NodeStyle) -> NodeStyle {
    let colors = style.colors;
    NodeStyle {
        colors: NodeColors {
            fill: colors.fill.darken(0.3),
            border: colors.border.with_alpha(96),
            text: colors.text.with_alpha(128),
            secondary_text: colors.secondary_text.with_alpha(128),
        },
        font_bold: false,
        ..style.clone()
    }
}
