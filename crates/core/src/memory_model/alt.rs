//! The revised model of Ševčík and Aspinall (ECOOP 2008).
//!
//! Rules 3 and 8 are dropped. Rule 2 only constrains the happens-before
//! edge between a committed read and its write-seen, rule 7 only checks the
//! main write-seen, and rule 9 is stated over the main execution's hb.

use jmmcheck_smtlib::Term;
use jmmcheck_smtlib::builder::{and, bool_lit, iff, implies, not};

use super::{
    MemoryModel, ModelKind, RoundContext, external_predecessors_committed,
    writes_seen_committed,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct AltModel;

impl MemoryModel for AltModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Alt
    }

    fn hb_agreement(&self, ctx: &RoundContext<'_, '_>) -> Term {
        let p = ctx.program;
        let cur = ctx.current();
        and(p.reads().into_iter().map(|r| {
            let per_write = p.candidate_writes(r).iter().map(|&x| {
                implies(
                    ctx.main.w(r, x),
                    and(vec![
                        iff(ctx.main.hb(x, r), cur.hb(x, r)),
                        not(cur.hb(r, x)),
                    ]),
                )
            });
            implies(ctx.committed(r), and(per_write))
        }))
    }

    fn so_agreement(&self, _ctx: &RoundContext<'_, '_>) -> Term {
        bool_lit(true)
    }

    fn new_reads_see_committed(&self, ctx: &RoundContext<'_, '_>) -> Term {
        writes_seen_committed(ctx, false)
    }

    fn sufficient_sync(&self, _ctx: &RoundContext<'_, '_>) -> Term {
        bool_lit(true)
    }

    fn external_actions(&self, ctx: &RoundContext<'_, '_>) -> Term {
        external_predecessors_committed(ctx, ctx.main)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Execution;
    use crate::justify::CommitChain;
    use crate::memory_model::fixtures;

    #[test]
    fn dropped_rules_are_trivial() {
        let (p, _) = fixtures::lock_then_external();
        let main = Execution::main(&p);
        let spec = vec![Execution::speculative(&p, 1)];
        let commits = CommitChain::new(2);
        let ctx = RoundContext {
            program: &p,
            main: &main,
            speculative: &spec,
            commits: &commits,
            round: 1,
        };
        assert!(AltModel.so_agreement(&ctx).is_true());
        assert!(AltModel.sufficient_sync(&ctx).is_true());
    }

    #[test]
    fn external_rule_uses_main_hb() {
        let (p, _) = fixtures::lock_then_external();
        let main = Execution::main(&p);
        let spec = vec![Execution::speculative(&p, 1)];
        let commits = CommitChain::new(2);
        let ctx = RoundContext {
            program: &p,
            main: &main,
            speculative: &spec,
            commits: &commits,
            round: 1,
        };
        let text = AltModel.external_actions(&ctx).to_string();
        assert!(text.contains("e_hb_"), "{text}");
        assert!(!text.contains("e1_hb_"), "{text}");
    }

    #[test]
    fn committed_reads_keep_their_hb_edge() {
        let (p, [r1, ..]) = fixtures::copy_loop();
        let main = Execution::main(&p);
        let spec = vec![Execution::speculative(&p, 1), Execution::speculative(&p, 2)];
        let commits = CommitChain::new(3);
        let ctx = RoundContext {
            program: &p,
            main: &main,
            speculative: &spec,
            commits: &commits,
            round: 2,
        };
        let text = AltModel.hb_agreement(&ctx).to_string();
        assert!(text.contains(&format!("c2_{}", r1.0)), "{text}");
        assert!(text.contains("e2_hb_"), "{text}");

        let rule7 = AltModel.new_reads_see_committed(&ctx).to_string();
        assert!(rule7.contains(&format!("e_w_{}_", r1.0)), "{rule7}");
        assert!(!rule7.contains("e2_w_"), "{rule7}");
    }
}
