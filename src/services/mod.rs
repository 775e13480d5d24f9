pub mod lexicon;
pub mod masking;
pub mod orchestrator;
pub mod provider;
pub mod round;
pub mod scoring;
pub mod tokenizer;
