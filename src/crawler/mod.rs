/// 寶信明州 (Bảo Tín Minh Châu)
pub mod btmc;
