use hypertext::prelude::*;

/// A row of link buttons. The first link is the primary action.
pub struct Actions<'r> {
    pub options: &'r [(&'r str, &'r str)],
}

impl<'r> Renderable for Actions<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="row mt-3 mb-3" {
                @for (i, (link, text)) in self.options.iter().enumerate() {
                    div class="col-md-auto" {
                        a class=(if i == 0 { "btn btn-primary" } else { "btn btn-outline-primary" })
                            href=(link) {
                            (text)
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
