//! Per-category totals for the Summary table.
//!
//! Every history record is classified by (contract, event type) and by
//! whether the user is the sender or the receiver. Outgoing amounts are
//! subtracted, incoming amounts added, so each counter reads as the net
//! effect on the user's balance.

use super::data::HistoryRecord;
use crate::error::{FolioError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub savva_in: i128,
    pub savva_out: i128,
    pub donations_contributed: i128,
    pub donations_received: i128,
    pub fund_contributed: i128,
    pub fund_prizes_won: i128,
    pub staking_in: i128,
    pub staking_out: i128,
    pub staking_staked: i128,
    pub club_buy: i128,
    pub club_claimed: i128,
    pub fundraise_contributed: i128,
    pub fundraise_received: i128,
    pub paid_for_promotion: i128,
    pub nft_share_received: i128,
    pub nft_sold_received: i128,
    pub nft_auction_bids: i128,
    pub nft_auction_received: i128,
}

impl Counters {
    /// Fails with a data error when a counter would overflow.
    pub fn from_history(history: &[HistoryRecord], user: &str) -> Result<Self> {
        let mut c = Counters::default();
        for record in history {
            c.add(record, user)?;
        }
        Ok(c)
    }

    fn add(&mut self, h: &HistoryRecord, user: &str) -> Result<()> {
        let sent = h.from.eq_ignore_ascii_case(user);
        let received = h.to.eq_ignore_ascii_case(user);
        let amount = h.amount;

        match (h.contract.as_str(), h.kind.as_str()) {
            ("token", "transfer") => {
                if sent {
                    debit(&mut self.savva_out, amount)?;
                } else if received {
                    credit(&mut self.savva_in, amount)?;
                }
            }
            ("fund", "donation") => {
                if sent {
                    debit(&mut self.donations_contributed, amount)?;
                }
                if received {
                    credit(&mut self.donations_received, amount)?;
                }
            }
            ("fund", "contribute") if sent => debit(&mut self.fund_contributed, amount)?,
            ("fund", "prize") if received => credit(&mut self.fund_prizes_won, amount)?,
            ("fund", "nft_share") if received => credit(&mut self.nft_share_received, amount)?,
            ("staking", "transferred") => {
                if sent {
                    debit(&mut self.staking_out, amount)?;
                } else if received {
                    credit(&mut self.staking_in, amount)?;
                }
            }
            ("staking", "staked") if sent => debit(&mut self.staking_staked, amount)?,
            ("staking", "us_claimed") if received => credit(&mut self.staking_staked, amount)?,
            ("club", "buy") if sent => debit(&mut self.club_buy, amount)?,
            // Stopping a sponsorship refunds the unused part.
            ("club", "stopped") if received => credit(&mut self.club_buy, amount)?,
            ("club", "claimed") if received => credit(&mut self.club_claimed, amount)?,
            ("fundraise", "contribution") if sent => debit(&mut self.fundraise_contributed, amount)?,
            ("fundraise", "campaign_closed") if received => credit(&mut self.fundraise_received, amount)?,
            ("promotion", "list_bought") if sent => debit(&mut self.paid_for_promotion, amount)?,
            ("nft_market", "NFTBought") if sent => debit(&mut self.nft_sold_received, amount)?,
            ("auction", "bid") if sent => debit(&mut self.nft_auction_bids, amount)?,
            ("auction", "bid_refund") if received => credit(&mut self.nft_auction_bids, amount)?,
            ("auction", "finalized") if received => credit(&mut self.nft_auction_received, amount)?,
            _ => {}
        }
        Ok(())
    }

    /// Summary rows in display order: translation key and value.
    pub fn rows(&self) -> [(&'static str, i128); 18] {
        [
            ("summary.savva_in", self.savva_in),
            ("summary.savva_out", self.savva_out),
            ("summary.donations_contributed", self.donations_contributed),
            ("summary.donations_received", self.donations_received),
            ("summary.fund_contributed", self.fund_contributed),
            ("summary.fund_prizes_won", self.fund_prizes_won),
            ("summary.staking_in", self.staking_in),
            ("summary.staking_out", self.staking_out),
            ("summary.staking_staked", self.staking_staked),
            ("summary.club_buy", self.club_buy),
            ("summary.club_claimed", self.club_claimed),
            ("summary.fundraise_contributed", self.fundraise_contributed),
            ("summary.fundraise_received", self.fundraise_received),
            ("summary.paid_for_promotion", self.paid_for_promotion),
            ("summary.nft_share_received", self.nft_share_received),
            ("summary.nft_sold_received", self.nft_sold_received),
            ("summary.nft_auction_bids", self.nft_auction_bids),
            ("summary.nft_auction_received", self.nft_auction_received),
        ]
    }
}

fn credit(counter: &mut i128, amount: i128) -> Result<()> {
    *counter = counter.checked_add(amount).ok_or_else(overflow)?;
    Ok(())
}

fn debit(counter: &mut i128, amount: i128) -> Result<()> {
    *counter = counter.checked_sub(amount).ok_or_else(overflow)?;
    Ok(())
}

fn overflow() -> FolioError {
    FolioError::Data("summary counter overflows".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const ME: &str = "0xMe";
    const OTHER: &str = "0xOther";

    fn record(contract: &str, kind: &str, from: &str, to: &str, amount: i128) -> HistoryRecord {
        HistoryRecord {
            contract: contract.to_string(),
            kind: kind.to_string(),
            domain: None,
            from: from.to_string(),
            to: to.to_string(),
            amount,
            timestamp: Utc.with_ymd_and_hms(2025, 2, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn transfers_by_direction() {
        let history = vec![
            record("token", "transfer", OTHER, ME, 100),
            record("token", "transfer", ME, OTHER, 30),
            record("token", "transfer", OTHER, "0xThird", 999),
        ];
        let c = Counters::from_history(&history, ME).unwrap();
        assert_eq!(c.savva_in, 100);
        assert_eq!(c.savva_out, -30);
    }

    #[test]
    fn refunds_offset_spending() {
        let history = vec![
            record("club", "buy", ME, OTHER, 50),
            record("club", "stopped", OTHER, ME, 20),
            record("auction", "bid", ME, OTHER, 10),
            record("auction", "bid_refund", OTHER, ME, 10),
            record("staking", "staked", ME, OTHER, 7),
            record("staking", "us_claimed", OTHER, ME, 2),
        ];
        let c = Counters::from_history(&history, ME).unwrap();
        assert_eq!(c.club_buy, -30);
        assert_eq!(c.nft_auction_bids, 0);
        assert_eq!(c.staking_staked, -5);
    }

    #[test]
    fn wrong_direction_is_ignored() {
        let history = vec![
            record("fund", "prize", ME, OTHER, 10),
            record("fund", "contribute", OTHER, ME, 10),
            record("unknown", "transfer", OTHER, ME, 10),
        ];
        assert_eq!(Counters::from_history(&history, ME).unwrap(), Counters::default());
    }

    #[test]
    fn address_match_ignores_case() {
        let history = vec![record("fund", "donation", OTHER, "0XME", 5)];
        let c = Counters::from_history(&history, ME).unwrap();
        assert_eq!(c.donations_received, 5);
    }

    #[test]
    fn hostile_amounts_are_a_data_error() {
        let history = vec![
            record("token", "transfer", OTHER, ME, i128::MAX),
            record("token", "transfer", OTHER, ME, 1),
        ];
        assert!(matches!(Counters::from_history(&history, ME), Err(FolioError::Data(_))));
        let history = vec![record("club", "buy", ME, OTHER, i128::MIN)];
        assert!(Counters::from_history(&history, ME).is_err());
    }

    #[test]
    fn rows_cover_every_counter_once() {
        let rows = Counters::default().rows();
        let mut keys: Vec<_> = rows.iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 18);
        for key in keys {
            assert!(!crate::i18n::translate(key, "en").starts_with('['), "{}", key);
        }
    }
}
