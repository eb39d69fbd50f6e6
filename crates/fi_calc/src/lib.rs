//! Financial-independence calculations.
//!
//! Every public function in [`fi`] is a pure, synchronous calculation with a
//! markdown doc comment. `#[fi_module]` turns the module into a descriptor
//! table so the functions can be served as tools:
//!
//! ```
//! let library = fi_calc::library();
//! assert!(library.module(fi_calc::MODULE_NAME).is_some());
//! ```
//!
//! Rates are decimals (`0.04` for 4%) unless a parameter says it is a
//! percentage.

mod error;

pub use error::CalcError;

use fi_tools::{Library, fi_module};

/// Name `fi_calc` registers its module under.
pub const MODULE_NAME: &str = "fi";

/// A library holding the [`fi`] module.
#[must_use]
pub fn library() -> Library {
    Library::new().with_module(fi::module())
}

/// Financial-independence calculations.
#[fi_module(exclude(round_to))]
pub mod fi {
    use crate::error::{CalcError, non_negative, positive};
    use serde::Serialize;

    /// Longest horizon [`years_to_fi`] searches.
    pub const MAX_YEARS: u32 = 200;

    /// Withdrawal amounts for a portfolio.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct WithdrawalPlan {
        /// Yearly withdrawal.
        pub annual: f64,
        /// Monthly withdrawal.
        pub monthly: f64,
        /// Daily withdrawal.
        pub daily: f64,
    }

    /// Calculates the true annual cost of owning an item, including
    /// depreciation and running costs.
    ///
    /// ### Args:
    /// - **purchase_price**: Price paid for the item.
    /// - **resale_value**: Expected value when the item is sold.
    /// - **years_owned**: Number of years the item is kept.
    /// - **annual_running_cost**: Yearly maintenance, insurance and fuel.
    ///
    /// ### Returns:
    /// The yearly cost: depreciation spread over the ownership period plus
    /// running costs.
    ///
    /// ### Example:
    /// A 30,000 car sold for 10,000 after 5 years with 2,000 of yearly upkeep
    /// costs 6,000 a year.
    pub fn annual_cost(
        purchase_price: f64,
        resale_value: f64,
        years_owned: f64,
        annual_running_cost: f64,
    ) -> Result<f64, CalcError> {
        let years = positive("years_owned", years_owned)?;
        Ok((purchase_price - resale_value) / years + annual_running_cost)
    }

    /// Calculates how much a day of freedom costs: the capital whose safe
    /// withdrawal covers one day of spending forever.
    ///
    /// ### Args:
    /// - **annual_spending**: Yearly living expenses.
    /// - **withdrawal_rate**: Safe withdrawal rate as a decimal.
    ///
    /// ### Returns:
    /// Capital needed to fund one day of expenses in perpetuity.
    pub fn buy_a_day_of_freedom(
        annual_spending: f64,
        #[default(0.04)] withdrawal_rate: f64,
    ) -> Result<f64, CalcError> {
        let rate = positive("withdrawal_rate", withdrawal_rate)?;
        Ok(annual_spending / 365.0 / rate)
    }

    /// Calculates what current investments grow to by retirement if no
    /// further contributions are made (the Coast FI figure).
    ///
    /// ### Args:
    /// - **invested_amount**: Amount invested today.
    /// - **rate**: Expected annual real rate of return as a decimal.
    /// - **retirement_age**: Age at which you plan to retire.
    /// - **current_age**: Your age today.
    ///
    /// ### Returns:
    /// The projected portfolio value at retirement.
    ///
    /// ### Sources:
    /// - https://www.investopedia.com/coast-fire-6823286
    pub fn coast_fi(
        invested_amount: f64,
        rate: f64,
        retirement_age: u32,
        current_age: u32,
    ) -> Result<f64, CalcError> {
        let years = years_until(retirement_age, current_age)?;
        Ok(invested_amount * (1.0 + rate).powf(years))
    }

    /// Calculates the amount that must be invested today to coast to a
    /// target number by retirement.
    ///
    /// ### Args:
    /// - **fi_number**: Portfolio value needed at retirement.
    /// - **rate**: Expected annual real rate of return as a decimal.
    /// - **retirement_age**: Age at which you plan to retire.
    /// - **current_age**: Your age today.
    ///
    /// ### Returns:
    /// The Coast FI number: the investment needed today.
    pub fn coast_fi_number(
        fi_number: f64,
        rate: f64,
        retirement_age: u32,
        current_age: u32,
    ) -> Result<f64, CalcError> {
        let years = years_until(retirement_age, current_age)?;
        Ok(fi_number / (1.0 + rate).powf(years))
    }

    /// Calculates the portfolio size needed to live off investments.
    ///
    /// ### Args:
    /// - **annual_spending**: Yearly living expenses.
    /// - **withdrawal_rate**: Safe withdrawal rate as a decimal.
    ///
    /// ### Returns:
    /// The FI number: annual spending divided by the withdrawal rate.
    ///
    /// ### Sources:
    /// - Trinity study: https://en.wikipedia.org/wiki/Trinity_study
    pub fn fi_number(
        annual_spending: f64,
        #[default(0.04)] withdrawal_rate: f64,
    ) -> Result<f64, CalcError> {
        let rate = positive("withdrawal_rate", withdrawal_rate)?;
        Ok(annual_spending / rate)
    }

    /// Calculates the future value of a present amount with compound
    /// interest.
    ///
    /// ### Args:
    /// - **present_value**: The amount invested today.
    /// - **annual_rate**: Annual rate of return, as a percentage
    ///   (7 for 7%).
    /// - **periods_per_year**: Compounding periods per year.
    /// - **years**: Number of years invested.
    ///
    /// ### Returns:
    /// The value at the end of the term.
    ///
    /// ### Sources:
    /// - https://www.investopedia.com/terms/f/futurevalue.asp
    pub fn future_value(
        present_value: f64,
        annual_rate: f64,
        periods_per_year: u32,
        years: f64,
    ) -> Result<f64, CalcError> {
        let periods = positive("periods_per_year", f64::from(periods_per_year))?;
        Ok(present_value * growth_factor(annual_rate / 100.0, periods, years))
    }

    /// Calculates today's value of a future amount.
    ///
    /// ### Args:
    /// - **future_value**: The amount received in the future.
    /// - **annual_rate**: Annual discount rate, as a percentage.
    /// - **periods_per_year**: Compounding periods per year.
    /// - **years**: Years until the amount is received.
    ///
    /// ### Returns:
    /// The present value.
    ///
    /// ### Sources:
    /// - https://www.investopedia.com/terms/p/presentvalue.asp
    pub fn present_value(
        future_value: f64,
        annual_rate: f64,
        periods_per_year: u32,
        years: f64,
    ) -> Result<f64, CalcError> {
        let periods = positive("periods_per_year", f64::from(periods_per_year))?;
        Ok(future_value / growth_factor(annual_rate / 100.0, periods, years))
    }

    /// Estimates how many years it takes for an investment to double.
    ///
    /// ### Args:
    /// - **annual_rate**: Annual rate of return, as a percentage.
    /// - **exact**: Use the exact logarithmic formula instead of 72 / rate.
    ///
    /// ### Returns:
    /// Years to double.
    pub fn rule_of_72(annual_rate: f64, #[default(false)] exact: bool) -> Result<f64, CalcError> {
        let rate = positive("annual_rate", annual_rate)?;
        if exact {
            Ok(2f64.ln() / (1.0 + rate / 100.0).ln())
        } else {
            Ok(72.0 / rate)
        }
    }

    /// Calculates the share of income that is saved.
    ///
    /// ### Args:
    /// - **income**: Take-home income for the period.
    /// - **spending**: Spending for the same period.
    ///
    /// ### Returns:
    /// The savings rate as a percentage of income.
    pub fn savings_rate(income: f64, spending: f64) -> Result<f64, CalcError> {
        let income = positive("income", income)?;
        Ok((income - spending) / income * 100.0)
    }

    /// Calculates income after deductions and tax.
    ///
    /// ### Args:
    /// - **gross_income**: Income before deductions.
    /// - **deductions**: Pre-tax deductions such as pension contributions.
    /// - **tax_rate**: Flat tax rate as a decimal; no tax when omitted.
    ///
    /// ### Returns:
    /// Income left after deductions and tax.
    pub fn take_home_pay(
        gross_income: f64,
        deductions: Vec<f64>,
        tax_rate: Option<f64>,
    ) -> Result<f64, CalcError> {
        let taxable = gross_income - deductions.iter().sum::<f64>();
        let tax_rate = non_negative("tax_rate", tax_rate.unwrap_or(0.0))?;
        Ok(taxable * (1.0 - tax_rate))
    }

    /// Splits a portfolio's safe withdrawal into yearly, monthly and daily
    /// amounts.
    ///
    /// ### Args:
    /// - **portfolio**: Current portfolio value.
    /// - **withdrawal_rate**: Safe withdrawal rate as a decimal.
    ///
    /// ### Returns:
    /// An object with `annual`, `monthly` and `daily` amounts, rounded to
    /// cents.
    pub fn safe_withdrawal(
        portfolio: f64,
        #[default(0.04)] withdrawal_rate: f64,
    ) -> Result<WithdrawalPlan, CalcError> {
        let rate = non_negative("withdrawal_rate", withdrawal_rate)?;
        let annual = portfolio * rate;
        Ok(WithdrawalPlan {
            annual: round_to(annual, 2),
            monthly: round_to(annual / 12.0, 2),
            daily: round_to(annual / 365.0, 2),
        })
    }

    /// Calculates compound growth with optional yearly contributions.
    ///
    /// ### Args:
    /// - **principal**: Starting balance.
    /// - **annual_rate**: Annual rate of return, as a percentage.
    /// - **years**: Number of years.
    /// - **frequency**: Compounding frequency.
    /// - **annual_contribution**: Amount added each year, spread evenly over
    ///   the compounding periods.
    ///
    /// ### Returns:
    /// The ending balance.
    pub fn compound_growth(
        principal: f64,
        annual_rate: f64,
        years: u32,
        #[choices("annually", "quarterly", "monthly", "daily")]
        #[default(String::from("annually"))]
        frequency: String,
        #[default(0.0)] annual_contribution: f64,
    ) -> f64 {
        let periods = periods_per_year(&frequency);
        let rate = annual_rate / 100.0 / periods;
        let deposit = annual_contribution / periods;
        let n = f64::from(years) * periods;
        if rate == 0.0 {
            return principal + deposit * n;
        }
        let growth = (1.0 + rate).powf(n);
        principal * growth + deposit * (growth - 1.0) / rate
    }

    /// Calculates how many years of saving it takes to reach financial
    /// independence.
    ///
    /// ### Args:
    /// - **current_savings**: Amount invested today.
    /// - **annual_contribution**: Amount invested at the end of each year.
    /// - **annual_spending**: Yearly living expenses in retirement.
    /// - **rate**: Expected annual real rate of return as a decimal.
    /// - **withdrawal_rate**: Safe withdrawal rate as a decimal.
    ///
    /// ### Returns:
    /// Whole years until the portfolio reaches the FI number.
    pub fn years_to_fi(
        current_savings: f64,
        annual_contribution: f64,
        annual_spending: f64,
        rate: f64,
        #[default(0.04)] withdrawal_rate: f64,
    ) -> Result<u32, CalcError> {
        let target = fi_number(annual_spending, withdrawal_rate)?;
        let mut balance = current_savings;
        for year in 0..=MAX_YEARS {
            if balance >= target {
                return Ok(year);
            }
            balance = balance * (1.0 + rate) + annual_contribution;
        }
        Err(CalcError::Unreachable { years: MAX_YEARS })
    }

    /// Rounds a value to a number of decimal places.
    ///
    /// ### Args:
    /// - **value**: The value to round.
    /// - **places**: Number of decimal places.
    ///
    /// ### Returns:
    /// The rounded value.
    pub fn round_to(value: f64, places: i32) -> f64 {
        let factor = 10f64.powi(places);
        (value * factor).round() / factor
    }

    fn growth_factor(rate: f64, periods: f64, years: f64) -> f64 {
        (1.0 + rate / periods).powf(periods * years)
    }

    fn years_until(retirement_age: u32, current_age: u32) -> Result<f64, CalcError> {
        retirement_age
            .checked_sub(current_age)
            .map(f64::from)
            .ok_or(CalcError::AgeOrder {
                current_age,
                retirement_age,
            })
    }

    fn periods_per_year(frequency: &str) -> f64 {
        match frequency {
            "daily" => 365.0,
            "monthly" => 12.0,
            "quarterly" => 4.0,
            _ => 1.0,
        }
    }
}
