mod auth_tests;
mod panel_tests;
mod status_flow_tests;
