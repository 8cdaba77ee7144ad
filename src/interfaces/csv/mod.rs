pub mod graph_reader;
