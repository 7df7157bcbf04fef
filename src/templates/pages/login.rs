use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn login_page(expired: bool, has_token: bool) -> Markup {
    desktop_layout(
        "Login",
        html! {
            main class="container" {
                h1 { "Login" }

                @if expired {
                    div class="banner banner-warning" {
                        p { "Your session expired. Enter a new access token to continue." }
                    }
                }

                @if has_token {
                    p { "A token is currently stored." }
                    form action="/logout" method="post" {
                        button type="submit" { "Log out" }
                    }
                }

                section class="card" {
                    form action="/login" method="post" {
                        label for="token" { "CivicConnect access token" }
                        input type="password" name="token" id="token" required;
                        button type="submit" { "Save token" }
                    }
                }
            }
        },
    )
}
