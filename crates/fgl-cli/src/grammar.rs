//! `fgl grammar`: statistics and conflict audit of the built-in grammar.

use fgl_syntax::lalr::ConflictKind;
use fgl_syntax::Language;

pub fn run(conflicts: bool) -> anyhow::Result<()> {
    let language = Language::try_informix().map_err(|err| anyhow::anyhow!("{err}"))?;
    let grammar = language.grammar();
    let automaton = language.automaton();

    let shift_reduce = automaton
        .conflicts()
        .iter()
        .filter(|conflict| conflict.kind == ConflictKind::ShiftReduce)
        .count();
    println!("grammar:      {}", grammar.name());
    println!("terminals:    {}", grammar.terminals().len());
    println!("nonterminals: {}", grammar.nonterminals().len());
    println!("productions:  {}", grammar.productions().len());
    println!("states:       {}", automaton.state_count());
    println!(
        "conflicts:    {} ({} shift/reduce, {} reduce/reduce)",
        automaton.conflicts().len(),
        shift_reduce,
        automaton.conflicts().len() - shift_reduce
    );

    if conflicts {
        for conflict in automaton.conflicts() {
            println!("{}", conflict.describe(grammar));
        }
    }
    Ok(())
}
