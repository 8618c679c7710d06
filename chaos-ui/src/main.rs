mod app;
mod bridge;
mod dto;

fn main() {
    leptos::mount_to_body(app::App);
}
