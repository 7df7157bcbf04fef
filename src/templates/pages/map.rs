use crate::domain::report::Report;
use crate::templates::desktop_layout;
use maud::{html, Markup};

/// Placeholder map: a list of nearby issues by flattened location.
/// A real tile/routing integration is deliberately out of scope.
pub fn map_page(reports: &[Report], degraded: bool) -> Markup {
    desktop_layout(
        "Nearby Issues",
        html! {
            main class="container" {
                h1 { "Nearby Issues" }

                @if degraded {
                    p class="banner banner-warning" { "Showing cached or sample locations." }
                }

                div class="map-placeholder" {
                    p { "Map view coming soon." }
                }

                ul class="pin-list" {
                    @for report in reports {
                        li {
                            span class=(format!("pin status-{}", report.status.as_str())) { "📍" }
                            " "
                            a href=(format!("/reports/{}", report.id)) { (report.title) }
                            " — " (report.location)
                        }
                    }
                }
            }
        },
    )
}
