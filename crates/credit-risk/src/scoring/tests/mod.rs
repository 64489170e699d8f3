mod common;
mod explain;
mod routing;
