use crate::domain::report::Report;
use crate::domain::status::to_ui_status;
use crate::templates::components::priority_badge;
use crate::templates::desktop_layout;
use maud::{html, Markup};

/// How much history the detail view shows before trailing off.
const TIMELINE_LIMIT: usize = 10;

pub fn detail_page(report: &Report, pending_photo_count: usize) -> Markup {
    desktop_layout(
        &report.title,
        html! {
            main class="container" {
                h1 { (report.title) }
                p class="location" { (report.location) }
                p {
                    (priority_badge(report.priority))
                    " "
                    span class=(format!("badge status-{}", report.status.as_str())) {
                        (report.status.label())
                    }
                    " "
                    span class="category" { (report.category) }
                }
                p { (report.description) }

                section class="card" {
                    h3 { "History" }
                    @if report.timeline.is_empty() {
                        p { "No activity yet." }
                    } @else {
                        ol class="timeline" {
                            // Newest first; readers care about the latest word.
                            @for entry in report.recent_timeline(TIMELINE_LIMIT) {
                                li {
                                    strong { (to_ui_status(entry).label()) }
                                    @if let Some(ts) = entry.timestamp {
                                        " · " (ts.format("%Y-%m-%d %H:%M"))
                                    }
                                    @if let Some(comment) = &entry.comment {
                                        p class="comment" { (comment) }
                                    }
                                    @if !entry.images.is_empty() {
                                        div class="photo-row" {
                                            @for url in &entry.images {
                                                img src=(url) alt="timeline photo" loading="lazy";
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                section class="card" {
                    h3 { "Citizen photos" }
                    @if report.images.is_empty() { p { "None" } }
                    div class="photo-row" {
                        @for url in &report.images {
                            img src=(url) alt="citizen photo" loading="lazy";
                        }
                    }
                }

                section class="card" {
                    h3 { "Progress photos" }
                    @if report.progress_images.is_empty() { p { "None" } }
                    div class="photo-row" {
                        @for url in &report.progress_images {
                            img src=(url) alt="progress photo" loading="lazy";
                        }
                    }

                    @if pending_photo_count > 0 {
                        form action=(format!("/reports/{}/photos", report.id)) method="post" {
                            button type="submit" {
                                "Upload " (pending_photo_count) " captured photo(s)"
                            }
                        }
                    }
                }
            }
        },
    )
}
