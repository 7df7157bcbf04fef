use maud::{html, Markup};

/// Shown while the working set holds fallback data (snapshots or
/// samples). Non-blocking: the list below stays usable.
pub fn degraded_banner(back: &str) -> Markup {
    html! {
        div class="banner banner-warning" {
            p {
                "Could not reach the reports service. Showing the last "
                "data we have."
            }
            form action="/refresh" method="post" {
                input type="hidden" name="back" value=(back);
                button type="submit" { "Retry" }
            }
        }
    }
}

pub fn error_banner(message: &str, back: &str) -> Markup {
    html! {
        div class="banner banner-error" {
            p { (message) }
            form action="/refresh" method="post" {
                input type="hidden" name="back" value=(back);
                button type="submit" { "Retry" }
            }
        }
    }
}
