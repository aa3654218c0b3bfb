pub mod r#box;
pub mod input;
pub mod list;
pub mod main_window;
pub mod modal;
pub mod status;
pub mod tabs;
pub mod theme;
pub mod title;

pub use input::{draw_input, draw_inputs};
pub use list::{draw_list, list_next, list_prev};
pub use main_window::draw_main_window;
pub use modal::{centered_rect, draw_modal, draw_modal_lines};
pub use r#box::{draw_box, BoxProps};
pub use status::draw_status;
pub use tabs::{draw_tab_strip, hit_test};
pub use theme::Theme;
pub use title::draw_title_bar;
