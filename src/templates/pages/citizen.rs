use crate::db::photos::CachedPhoto;
use crate::domain::report::Report;
use crate::templates::components::{degraded_banner, error_banner, report_card};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct CitizenVm {
    pub reports: Vec<Report>,
    pub pending_photos: Vec<CachedPhoto>,
    pub degraded: bool,
    pub error: Option<String>,
}

pub fn citizen_page(vm: &CitizenVm) -> Markup {
    desktop_layout(
        "My Reports",
        html! {
            main class="container" {
                h1 { "My Reports" }

                @if let Some(message) = &vm.error {
                    (error_banner(message, "/"))
                } @else if vm.degraded {
                    (degraded_banner("/"))
                }

                @for report in &vm.reports {
                    (report_card(report, false))
                }

                @if vm.reports.is_empty() {
                    p { "You haven't submitted any reports yet." }
                }

                section class="card" {
                    h3 { "Captured photos" }
                    @if vm.pending_photos.is_empty() {
                        p { "No photos waiting to be attached." }
                    } @else {
                        ul {
                            @for photo in &vm.pending_photos {
                                li {
                                    code { (photo.id.get(..12).unwrap_or(&photo.id)) }
                                    @if let Some(report_id) = &photo.report_id {
                                        " → report " (report_id)
                                    }
                                }
                            }
                        }
                    }

                    form action="/photos" method="post" {
                        label for="data_url" { "Add a captured photo (data URL)" }
                        textarea name="data_url" id="data_url" rows="3" required {}
                        input type="text" name="report_id" placeholder="Attach to report id (optional)";
                        button type="submit" { "Save photo" }
                    }
                }
            }
        },
    )
}
