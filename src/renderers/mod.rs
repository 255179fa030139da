pub mod http;
pub mod renderer;
pub mod webdriver;

pub use http::HttpRenderer;
pub use renderer::PageRenderer;
pub use webdriver::WebDriverRenderer;
