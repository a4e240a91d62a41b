pub mod detail;
pub mod list;
pub mod map;
pub mod names;

pub use detail::load_apartment_detail;
pub use list::{ApartmentListModel, ListSnapshot};
pub use map::map_markers;
pub use names::NameMapper;
