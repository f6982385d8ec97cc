//! Templating code.
//!
//! This defines the [`Page`] item, which every HTML handler in this crate
//! wraps its content in.

use hypertext::prelude::*;

use crate::auth::User;

pub struct Page<R1: Renderable, R2: Renderable> {
    body: Option<R1>,
    user: Option<User>,
    extra_head: Option<R2>,
}

// unfortunate generic argument shenanigans
impl<R1: Renderable> Page<R1, String> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<R1: Renderable, R2: Renderable> Page<R1, R2> {
    pub fn new_full() -> Self {
        Default::default()
    }

    pub fn body(mut self, body: R1) -> Self {
        self.body = Some(body);
        self
    }

    pub fn user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn extra_head(mut self, content: R2) -> Page<R1, R2> {
        self.extra_head = Some(content);
        self
    }

    pub fn user_opt(mut self, user: Option<User>) -> Self {
        self.user = user;
        self
    }
}

impl<R1: Renderable, R2: Renderable> Renderable for Page<R1, R2> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            html {
                head {
                    title { "tunevote" }
                    link
                        href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css"
                        rel="stylesheet"
                        integrity="sha384-QWTKZyjpPEjISv5WaRU9OFeRpok6YctnYmDr5pNlyT2bRjXh0JMhjY6hW+ALEwIH"
                        crossorigin="anonymous";
                    meta
                        name="viewport"
                        content="width=device-width, initial-scale=1";
                    @if let Some(extra) = &self.extra_head {
                        (extra)
                    }
                }
                body class="d-flex flex-column vh-100" {
                    nav class="navbar navbar-expand"
                        style="background-color: #452859;"
                        data-bs-theme="dark" {
                        div class="container-fluid" {
                            a class="navbar-brand text-white" href="/" {
                                "tunevote"
                            }
                            ul class="navbar-nav me-auto" {
                                li class="nav-item" {
                                    a class="nav-link text-white" href="/vote" { "Vote" }
                                }
                                li class="nav-item" {
                                    a class="nav-link text-white" href="/results" { "Results" }
                                }
                                @if let Some(user) = &self.user {
                                    @if user.is_admin {
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/admin" { "Admin" }
                                        }
                                    }
                                }
                            }
                            ul class="navbar-nav" {
                                @if let Some(user) = &self.user {
                                    li class="nav-item" {
                                        span class="navbar-text text-white me-3" { (user.email) }
                                    }
                                    li class="nav-item" {
                                        form method="post" action="/logout" class="d-inline" {
                                            button type="submit" class="btn btn-sm btn-outline-light" {
                                                "Sign out"
                                            }
                                        }
                                    }
                                } @else {
                                    li class="nav-item" {
                                        a class="nav-link text-white" href="/login" {
                                            "Sign in"
                                        }
                                    }
                                }
                            }
                        }
                    }
                    div class="flex-grow-1" {
                        @if let Some(body) = &self.body {
                            (body)
                        }
                    }
                }
            }
        }.render_to(buffer)
    }
}

impl<R1: Renderable, R2: Renderable> Default for Page<R1, R2> {
    fn default() -> Self {
        Self {
            body: Default::default(),
            user: Default::default(),
            extra_head: Default::default(),
        }
    }
}
