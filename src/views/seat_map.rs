use std::collections::BTreeMap;

use crate::models::Seat;

/// Ценовая категория свободного места.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTier {
    Low,
    Mid,
    High,
}

impl PriceTier {
    pub fn for_price(price: f64) -> Self {
        if price <= 100.0 {
            PriceTier::Low
        } else if price <= 200.0 {
            PriceTier::Mid
        } else {
            PriceTier::High
        }
    }

    fn symbol(self) -> char {
        match self {
            PriceTier::Low => 'o',
            PriceTier::Mid => 'O',
            PriceTier::High => '@',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatMark {
    Reserved,
    Selected,
    Available(PriceTier),
}

impl SeatMark {
    fn symbol(self) -> char {
        match self {
            SeatMark::Reserved => 'x',
            SeatMark::Selected => '*',
            SeatMark::Available(tier) => tier.symbol(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeatCell {
    pub seat_id: i64,
    pub number: i32,
    pub price: f64,
    pub mark: SeatMark,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeatRow {
    pub row: i32,
    pub cells: Vec<SeatCell>,
}

/// Карта мест, разбитая на ряды по возрастанию номера.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeatMap {
    pub rows: Vec<SeatRow>,
}

impl SeatMap {
    /// `fallback_price` берётся из сеанса, если у места нет своей цены.
    pub fn build(seats: &[Seat], selected: Option<i64>, fallback_price: f64) -> Self {
        let mut rows: BTreeMap<i32, Vec<SeatCell>> = BTreeMap::new();
        for seat in seats {
            let price = seat.price.unwrap_or(fallback_price);
            let mark = if seat.is_reserved() {
                SeatMark::Reserved
            } else if selected == Some(seat.id) {
                SeatMark::Selected
            } else {
                SeatMark::Available(PriceTier::for_price(price))
            };
            rows.entry(seat.row).or_default().push(SeatCell {
                seat_id: seat.id,
                number: seat.seat_number,
                price,
                mark,
            });
        }

        let rows = rows
            .into_iter()
            .map(|(row, mut cells)| {
                cells.sort_by_key(|c| c.number);
                SeatRow { row, cells }
            })
            .collect();
        Self { rows }
    }

    pub fn seat_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).sum()
    }

    pub fn find(&self, seat_id: i64) -> Option<(i32, &SeatCell)> {
        self.rows.iter().find_map(|r| {
            r.cells
                .iter()
                .find(|c| c.seat_id == seat_id)
                .map(|c| (r.row, c))
        })
    }

    pub fn render(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|r| r.cells.len())
            .max()
            .unwrap_or(0)
            * 5;
        let mut out = format!("{:^width$}\n", "SCREEN", width = width.max(6) + 5);
        for row in &self.rows {
            out.push_str(&format!("{:>3} |", row.row));
            for cell in &row.cells {
                out.push_str(&format!(" {:>3}{}", cell.number, cell.mark.symbol()));
            }
            out.push('\n');
        }
        out
    }
}

pub fn legend() -> Vec<(char, &'static str)> {
    vec![
        (SeatMark::Reserved.symbol(), "reserved"),
        (SeatMark::Selected.symbol(), "selected"),
        (PriceTier::Low.symbol(), "up to 100"),
        (PriceTier::Mid.symbol(), "up to 200"),
        (PriceTier::High.symbol(), "vip"),
    ]
}
