pub mod raw;
pub mod model;
pub mod loader;

pub use model::{
    Condition, HttpMethod, Matcher, ResponsePart, Severity, Step, Template, TemplateInfo,
    TimeThreshold, BASE_URL_PLACEHOLDER,
};
pub use loader::{load_template_file, parse_template_str, SkippedTemplate, TemplateLibrary};
