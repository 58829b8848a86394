// Library exports for markview

pub mod block_renderer;
pub mod coords;
pub mod document_widget;
pub mod inline_renderer;
pub mod markdown_ast;
pub mod markdown_parser;
pub mod serializer;
pub mod theme;
pub mod widget;
