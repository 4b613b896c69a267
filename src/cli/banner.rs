use console::style;

const BRAND: u8 = 209;
const DIM: u8 = 240;
const TAGLINE: &str = "Template-driven HTTP vulnerability scanner";

pub fn banner_text() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = option_env!("GIT_HASH").unwrap_or("dev");
    let built = option_env!("BUILD_TIMESTAMP").unwrap_or("unknown");
    format!(
        "\n  {} {}\n  {}\n  {}\n",
        style("rwscan").color256(BRAND).bold(),
        style(format!("v{} ({})", version, git_hash)).color256(DIM),
        TAGLINE,
        style(format!("built {}", built)).color256(DIM),
    )
}

pub fn print_banner() {
    eprintln!("{}", banner_text());
}
