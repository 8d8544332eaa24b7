use survival_concordance::{classify_pair, count_pairs, Convention, Subject, SurvivalData};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Concordance Index - Basic Usage Example");
    println!("=======================================\n");

    let subjects = vec![
        Subject::new(1.0, true, 6.0),
        Subject::new(3.0, true, 3.0),
        Subject::new(4.0, false, 5.0), // censored
        Subject::new(6.0, true, 2.0),
        Subject::new(9.0, true, 4.0),
    ];
    let data = SurvivalData::from_subjects(&subjects)?;

    println!("Dataset Information:");
    println!("  - Number of subjects: {}", data.n_samples());
    println!("  - Number of events: {}", data.n_events());
    println!("  - Number of censored: {}", data.n_samples() - data.n_events());
    println!();

    for convention in [Convention::AllPairs, Convention::Harrell] {
        let counts = count_pairs(&data, convention);
        println!("{:?}:", convention);
        println!("  concordant {}  discordant {}  tied {}", counts.concordant, counts.discordant, counts.tied);
        match counts.concordance_index(convention) {
            Some(c) => println!("  c-index {:.4}", c),
            None => println!("  c-index undefined (no comparable pairs)"),
        }
    }
    println!();

    println!("Pair by pair (Harrell):");
    for i in 0..subjects.len() {
        for j in (i + 1)..subjects.len() {
            let outcome = classify_pair(&subjects[i], &subjects[j], Convention::Harrell);
            println!("  t={} vs t={}: {:?}", subjects[i].time, subjects[j].time, outcome);
        }
    }

    Ok(())
}
