use crate::core::config::Config;
use crate::ui::builtin_themes::load_builtin_themes;

pub fn list_themes() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let current = config.theme_or_default();

    println!("Available themes:\n");
    for t in load_builtin_themes() {
        let mark = if t.id.eq_ignore_ascii_case(current) {
            "*"
        } else {
            " "
        };
        println!("  {} {} - {}", mark, t.id, t.display_name);
    }

    match config.theme.as_deref() {
        Some(theme) => println!("\nCurrent: {theme}"),
        None => println!("\nCurrent: (default: {current})"),
    }
    Ok(())
}
