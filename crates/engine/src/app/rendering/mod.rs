mod renderer;

pub(crate) use renderer::Renderer;
