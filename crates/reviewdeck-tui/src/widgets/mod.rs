mod popup;
mod review_strip;
mod status_bar;
mod toast;

pub use popup::PopupWidget;
pub use review_strip::ReviewStripWidget;
pub use status_bar::StatusBarWidget;
pub use toast::ToastWidget;
