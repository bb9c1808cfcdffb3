//! Sample data for demos and tests

use tracing::info;

use crate::error::Result;
use crate::store::traits::MachineStore;
use crate::types::{
    Contract, Dealer, EndUser, Installation, MachineInput, NcUnit, Sale, ServiceBase, Shipment,
};

/// Compact description of one sample installation
struct Sample {
    number: &'static str,
    maker: &'static str,
    model: &'static str,
    serial: &'static str,
    nc_maker: &'static str,
    nc_model: &'static str,
    contract: &'static str,
    contract_date: &'static str,
    amount: f64,
    dealer: &'static str,
    end_user: &'static str,
    city: &'static str,
    country: &'static str,
    service_base: &'static str,
}

const SAMPLES: &[Sample] = &[
    Sample {
        number: "GD-0001",
        maker: "Makino",
        model: "CNC-1000X",
        serial: "SN-2023-001",
        nc_maker: "FANUC",
        nc_model: "31i-B5",
        contract: "CT-2023-0045",
        contract_date: "2023/01/18",
        amount: 480000.0,
        dealer: "Chubu Machine Trading",
        end_user: "Toyota Manufacturing",
        city: "Toyota City",
        country: "Japan",
        service_base: "Tokyo Service Center",
    },
    Sample {
        number: "GD-0002",
        maker: "DMG MORI",
        model: "CNC-2000Y",
        serial: "SN-2023-002",
        nc_maker: "FANUC",
        nc_model: "32i-B",
        contract: "CT-2023-0046",
        contract_date: "2023/02/07",
        amount: 515000.0,
        dealer: "Kansai Tooling",
        end_user: "Honda Motor Co.",
        city: "Suzuka",
        country: "Japan",
        service_base: "Osaka Service Center",
    },
    Sample {
        number: "GD-0003",
        maker: "Okuma",
        model: "CNC-3000Z",
        serial: "SN-2023-003",
        nc_maker: "Okuma",
        nc_model: "OSP-P300M",
        contract: "CT-2023-0047",
        contract_date: "2023/03/22",
        amount: 620000.0,
        dealer: "Pacific Machine Supply",
        end_user: "Boeing",
        city: "Everett",
        country: "USA",
        service_base: "Seattle Service Center",
    },
    Sample {
        number: "GD-0004",
        maker: "Makino",
        model: "CNC-1500A",
        serial: "SN-2023-004",
        nc_maker: "FANUC",
        nc_model: "31i-B5",
        contract: "CT-2023-0048",
        contract_date: "2023/05/30",
        amount: 455000.0,
        dealer: "Occitanie Machines",
        end_user: "Airbus",
        city: "Toulouse",
        country: "France",
        service_base: "Toulouse Service Center",
    },
    Sample {
        number: "GD-0005",
        maker: "Haas",
        model: "CNC-2500B",
        serial: "SN-2023-005",
        nc_maker: "Haas",
        nc_model: "Haas NGC",
        contract: "CT-2023-0049",
        contract_date: "2023/08/14",
        amount: 210000.0,
        dealer: "New England Machinery",
        end_user: "General Electric",
        city: "Lynn",
        country: "USA",
        service_base: "Boston Service Center",
    },
    Sample {
        number: "GD-0006",
        maker: "DMG MORI",
        model: "CNC-3500C",
        serial: "SN-2024-001",
        nc_maker: "FANUC",
        nc_model: "32i-B",
        contract: "CT-2024-0001",
        contract_date: "2024/01/09",
        amount: 530000.0,
        dealer: "Brandenburg Werkzeug",
        end_user: "Volkswagen",
        city: "Wolfsburg",
        country: "Germany",
        service_base: "Berlin Service Center",
    },
    Sample {
        number: "GD-0007",
        maker: "Mazak",
        model: "CNC-4000D",
        serial: "SN-2024-002",
        nc_maker: "Mazak",
        nc_model: "MAZATROL Matrix 2",
        contract: "CT-2024-0002",
        contract_date: "2024/02/26",
        amount: 395000.0,
        dealer: "Lone Star Machine Tools",
        end_user: "Tesla",
        city: "Austin",
        country: "USA",
        service_base: "Austin Service Center",
    },
    Sample {
        number: "GD-0008",
        maker: "Okuma",
        model: "CNC-4500E",
        serial: "SN-2024-003",
        nc_maker: "Okuma",
        nc_model: "OSP-P300L",
        contract: "CT-2024-0003",
        contract_date: "2024/04/11",
        amount: 575000.0,
        dealer: "Kanagawa Precision Sales",
        end_user: "Nissan",
        city: "Yokohama",
        country: "Japan",
        service_base: "Yokohama Service Center",
    },
];

fn owned(s: &str) -> Option<String> {
    Some(s.to_string())
}

impl Sample {
    fn to_input(&self, index: usize) -> MachineInput {
        MachineInput {
            machine_number: self.number.to_string(),
            maker: owned(self.maker),
            model: owned(self.model),
            serial_number: owned(self.serial),
            nc_unit: Some(NcUnit {
                maker: owned(self.nc_maker),
                model: owned(self.nc_model),
                serial: Some(format!("NC-{:05}", 10_000 + index)),
            }),
            contract: Some(Contract {
                contract_number: owned(self.contract),
                contract_date: owned(self.contract_date),
                contract_type: owned("Purchase"),
                memo: None,
            }),
            sale: Some(Sale {
                sale_date: owned(self.contract_date),
                salesperson: owned("Field Sales"),
                amount: Some(self.amount),
                memo: None,
            }),
            dealer: Some(Dealer {
                name: owned(self.dealer),
                country: owned(self.country),
                contact: owned("Sales Desk"),
                phone: None,
                email: None,
            }),
            shipment: Some(Shipment {
                ship_date: None,
                method: owned("Sea freight"),
                tracking_number: Some(format!("TRK-{:06}", 500_000 + index)),
                destination: owned(self.city),
                memo: None,
            }),
            installation: Some(Installation {
                install_date: None,
                installer: owned("Field Engineering"),
                location: owned(self.city),
                country: owned(self.country),
                memo: None,
            }),
            end_user: Some(EndUser {
                company_name: owned(self.end_user),
                country: owned(self.country),
                contact: None,
                phone: None,
                email: None,
                address: owned(self.city),
            }),
            service_base: Some(ServiceBase {
                name: owned(self.service_base),
                country: owned(self.country),
                contact: None,
                phone: None,
                email: None,
            }),
        }
    }
}

/// The eight sample machines, each with every child block filled in
pub fn sample_machines() -> Vec<MachineInput> {
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, sample)| sample.to_input(i + 1))
        .collect()
}

/// Insert the sample machines unless the store already holds any machine.
///
/// # Returns
/// How many machines were inserted (0 when skipped)
pub async fn seed_sample_data(store: &dyn MachineStore) -> Result<usize> {
    let existing = store.count().await?;
    if existing > 0 {
        info!(existing, "Store already has machines, skipping sample data");
        return Ok(0);
    }

    let machines = sample_machines();
    for input in &machines {
        store.create(input).await?;
    }

    info!(count = machines.len(), "Seeded sample machines");
    Ok(machines.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::SqliteMachineStore;
    use crate::validation::validate_machine_input;

    #[test]
    fn test_samples_are_valid() {
        for input in sample_machines() {
            validate_machine_input(&input).unwrap();
        }
    }

    #[tokio::test]
    async fn test_seed_is_noop_when_populated() {
        let store = SqliteMachineStore::in_memory().await.unwrap();

        assert_eq!(seed_sample_data(&store).await.unwrap(), 8);
        assert_eq!(seed_sample_data(&store).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 8);
    }
}
