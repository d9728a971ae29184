mod carousel;
mod refresh_head;
mod status_bar;

pub use carousel::{visible_slides, CarouselWidget, SlideSpan};
pub use refresh_head::RefreshHeadWidget;
pub use status_bar::StatusBarWidget;
