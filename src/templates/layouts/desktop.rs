use maud::{html, Markup, DOCTYPE};

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · CivicConnect" }
                link rel="icon" href="/static/favicon/favicon.ico";
                link rel="stylesheet" href="/static/main.css";
            }
            body {
                header class="flex items-center justify-between px-6 py-3 shadow" {
                    svg
                        xmlns="http://www.w3.org/2000/svg"
                        width="24"
                        height="24"
                        viewBox="0 0 24 24"
                        fill="none"
                        stroke="#524ed2"
                        stroke-width="2"
                        stroke-linecap="round"
                        stroke-linejoin="round"
                        class="icon icon-tabler icon-tabler-map-pin"
                    {
                        path stroke="none" d="M0 0h24v24H0z" fill="none" {}
                        path d="M9 11a3 3 0 1 0 6 0a3 3 0 0 0 -6 0" {}
                        path d="M17.657 16.657l-4.243 4.243a2 2 0 0 1 -2.827 0l-4.244 -4.243a8 8 0 1 1 11.314 0z" {}
                    }
                    h3 { "CivicConnect" }
                    nav {
                        ul {
                            li { a href="/" { "My Reports" } }
                            li { a href="/worker" { "Field Panel" } }
                            li { a href="/map" { "Map" } }
                        }
                    }

                    a href="/login" class="text-base font-medium hover:text-blue-600" { "Login" }
                }
                (content)
            }
        }
    }
}
