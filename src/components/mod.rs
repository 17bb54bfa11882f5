pub mod attachment_list;
pub mod dialog;
pub mod help;
pub mod image_view;
pub mod preview_modal;
pub mod status_bar;
pub mod thumbnails;
