mod catalogue;
mod contact;
mod diagnostics;
mod health_check;
mod newsletter;

pub use catalogue::*;
pub use contact::*;
pub use diagnostics::*;
pub use health_check::*;
pub use newsletter::*;

/// Format an error followed by its chain of causes.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
