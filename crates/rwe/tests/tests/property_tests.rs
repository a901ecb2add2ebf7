#[path = "property/motif_bank.rs"]
mod motif_bank;

#[path = "property/novelty.rs"]
mod novelty;

#[path = "property/epochs.rs"]
mod epochs;

#[path = "property/mutation_sequences.rs"]
mod mutation_sequences;
