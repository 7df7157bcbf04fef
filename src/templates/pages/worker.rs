use crate::domain::logic::StatusCounts;
use crate::domain::report::Report;
use crate::templates::components::{degraded_banner, error_banner, report_card, status_form};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct WorkerVm {
    pub reports: Vec<Report>,
    pub counts: StatusCounts,
    pub degraded: bool,
    pub error: Option<String>,
    /// Transitions performed this session, fed by the event bus.
    pub transitions: u64,
}

pub fn worker_page(vm: &WorkerVm) -> Markup {
    desktop_layout(
        "Field Panel",
        html! {
            main class="container" {
                h1 { "Field Panel" }

                @if let Some(message) = &vm.error {
                    (error_banner(message, "/worker"))
                } @else if vm.degraded {
                    (degraded_banner("/worker"))
                }

                (badge_row(&vm.counts))

                p class="session-stat" {
                    "Updates this session: " strong { (vm.transitions) }
                    " · "
                    a href="/worker/export" { "Export spreadsheet" }
                }

                @if vm.reports.is_empty() {
                    p { "No reports assigned to you right now." }
                }

                @for report in &vm.reports {
                    div class="report-row" {
                        (report_card(report, true))
                        (status_form(report))
                    }
                }
            }
        },
    )
}

pub fn badge_row(counts: &StatusCounts) -> Markup {
    html! {
        section class="badge-row" id="status-badges" {
            span class="badge status-assigned" { "Assigned: " (counts.assigned) }
            span class="badge status-in-progress" { "In Progress: " (counts.in_progress) }
            span class="badge status-paused" { "Paused: " (counts.paused) }
            span class="badge status-completed" { "Completed: " (counts.completed) }
            span class="badge" { "Open: " (counts.open()) " of " (counts.total()) }
        }
    }
}
