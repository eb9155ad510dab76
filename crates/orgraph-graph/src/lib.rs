pub mod graph;
pub mod hit_tester;
pub mod layout;
pub mod mapper;
pub mod snapshot;
pub mod style;
pub mod viewport;

pub use graph::{EdgeIndex, GraphModel, NodeIndex};
pub use hit_tester::{HitResult, HitTester, Rect};
pub use layout::{GridLayouter, LayoutConfig, LayoutEngine, Layouter, TreeLayouter};
pub use mapper::{
    BackendRecord, MappedGraph, UNKNOWN_NAME, division_node_id, map_structure, map_to_edges,
    map_to_nodes, organization_node_id, refresh_functional_connections, staff_display_name,
    staff_node_id,
};
pub use snapshot::{GraphSnapshot, RemovedNode};
pub use style::{
    Color, EdgeStyle, NodeColors, NodeStyle, get_edge_kind_label, get_edge_style, get_kind_label,
    get_node_border_color, get_node_colors, get_node_style, inactive_style,
};
pub use viewport::{MAX_ZOOM, MIN_ZOOM, Viewport};
